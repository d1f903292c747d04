//! `hostproto`: JSON line protocol between the name-color daemon and the game host.
//!
//! Two sockets, one envelope style:
//! - control: one request line in, one response line out per connection,
//! - events: a `Subscribe` line, then a stream of event lines from the host.
//!
//! Every message is tagged JSON so either side can grow variants without
//! breaking older peers.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    /// Six lowercase hex digits, channels zero-padded.
    pub fn hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// One role as the host configures it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoleDef {
    pub name: String,
    pub color: RgbColor,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventsReq {
    Subscribe,
}

/// Host -> daemon, on the events socket.
///
/// `Command` carries the chat command word, the speaker, and whatever
/// arguments the host tokenized. `trusted` marks speakers the host
/// considers privileged (console operators).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    Join {
        player: String,
    },
    Leave {
        player: String,
    },
    Command {
        name: String,
        speaker: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        trusted: bool,
    },
}

/// Daemon -> host, on the control socket.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CtlReq {
    GetRoleSetup,
    GetPlayerRoles { player: String },
    GrantRole { role: String, player: String },
    RevokeRole { role: String, player: String },
    Whisper { player: String, text: String },
    RegisterCommands { commands: Vec<String> },
}

/// Host -> daemon, one line per control request.
///
/// `PlayerRoles { roles: None }` means the player is unknown to the host
/// (typically disconnected between event and lookup).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CtlResp {
    Ok,
    RoleSetup {
        roles: Vec<RoleDef>,
    },
    PlayerRoles {
        player: String,
        roles: Option<Vec<String>>,
    },
    Err {
        message: String,
    },
}
