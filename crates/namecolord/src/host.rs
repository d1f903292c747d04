use std::path::{Path, PathBuf};
use std::time::Duration;

use hostproto::{CtlReq, CtlResp, EventsReq, HostEvent, RoleDef};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::warn;

/// One-shot control call: connect, send one request line, read one
/// response line. The host reports its own failures in-band as
/// `CtlResp::Err`; transport failures surface here.
pub async fn ctl_call(sock: &Path, req: &CtlReq) -> anyhow::Result<CtlResp> {
    let mut stream = UnixStream::connect(sock)
        .await
        .map_err(|e| anyhow::anyhow!("connect host ctl sock {}: {e}", sock.display()))?;
    stream
        .write_all(serde_json::to_string(req)?.as_bytes())
        .await?;
    stream.write_all(b"\n").await?;
    let (rd, _) = stream.into_split();
    let mut rd = BufReader::new(rd);
    let mut line = String::new();
    rd.read_line(&mut line).await?;
    let raw = line.trim();
    if raw.is_empty() {
        return Err(anyhow::anyhow!("empty host ctl response"));
    }
    Ok(serde_json::from_str(raw)?)
}

pub async fn fetch_role_setup(sock: &Path) -> anyhow::Result<Vec<RoleDef>> {
    match ctl_call(sock, &CtlReq::GetRoleSetup).await? {
        CtlResp::RoleSetup { roles } => Ok(roles),
        CtlResp::Err { message } => Err(anyhow::anyhow!("host refused role setup: {message}")),
        other => Err(anyhow::anyhow!("unexpected role setup response: {other:?}")),
    }
}

/// `Ok(None)` means the host doesn't know the player (disconnected
/// between the event and this lookup).
pub async fn fetch_player_roles(sock: &Path, player: &str) -> anyhow::Result<Option<Vec<String>>> {
    let req = CtlReq::GetPlayerRoles {
        player: player.to_string(),
    };
    match ctl_call(sock, &req).await? {
        CtlResp::PlayerRoles { roles, .. } => Ok(roles),
        CtlResp::Err { message } => Err(anyhow::anyhow!("host refused player roles: {message}")),
        other => Err(anyhow::anyhow!("unexpected player roles response: {other:?}")),
    }
}

pub async fn register_commands(sock: &Path, commands: &[&str]) -> anyhow::Result<()> {
    let req = CtlReq::RegisterCommands {
        commands: commands.iter().map(|c| c.to_string()).collect(),
    };
    match ctl_call(sock, &req).await? {
        CtlResp::Err { message } => Err(anyhow::anyhow!("command registration refused: {message}")),
        _ => Ok(()),
    }
}

// Grants, revokes and whispers are fire-and-forget: a lost one is a
// cosmetic failure, so log and move on.

pub async fn grant_role(sock: &Path, role: &str, player: &str) {
    let req = CtlReq::GrantRole {
        role: role.to_string(),
        player: player.to_string(),
    };
    if let Err(e) = ctl_call(sock, &req).await {
        warn!(err = %e, role, player, "grant failed");
    }
}

pub async fn revoke_role(sock: &Path, role: &str, player: &str) {
    let req = CtlReq::RevokeRole {
        role: role.to_string(),
        player: player.to_string(),
    };
    if let Err(e) = ctl_call(sock, &req).await {
        warn!(err = %e, role, player, "revoke failed");
    }
}

pub async fn whisper(sock: &Path, player: &str, text: &str) {
    let req = CtlReq::Whisper {
        player: player.to_string(),
        text: text.to_string(),
    };
    if let Err(e) = ctl_call(sock, &req).await {
        warn!(err = %e, player, "whisper failed");
    }
}

/// Subscribe to the host event feed and forward parsed events to the
/// dispatcher. Reconnects with a short sleep on any failure; bad lines
/// are logged and skipped. Returns only when the dispatcher hangs up.
pub async fn events_task(sock: PathBuf, tx: tokio::sync::mpsc::Sender<HostEvent>) {
    let sub = EventsReq::Subscribe;

    loop {
        let mut stream = match UnixStream::connect(&sock).await {
            Ok(s) => s,
            Err(e) => {
                warn!(err = %e, path = %sock.display(), "host events connect failed");
                tokio::time::sleep(Duration::from_millis(500)).await;
                continue;
            }
        };

        if let Err(e) = stream
            .write_all(serde_json::to_string(&sub).expect("serialize subscribe").as_bytes())
            .await
        {
            warn!(err = %e, "failed to subscribe to host events");
            tokio::time::sleep(Duration::from_millis(200)).await;
            continue;
        }
        let _ = stream.write_all(b"\n").await;

        let (rd, _) = stream.into_split();
        let mut rd = BufReader::new(rd);
        let mut line = String::new();

        loop {
            line.clear();
            match rd.read_line(&mut line).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(err = %e, "host events read failed");
                    break;
                }
            }
            let raw = line.trim();
            if raw.is_empty() {
                continue;
            }
            let ev: HostEvent = match serde_json::from_str(raw) {
                Ok(v) => v,
                Err(e) => {
                    warn!(err = %e, line = %raw, "bad host event json");
                    continue;
                }
            };
            if tx.send(ev).await.is_err() {
                return;
            }
        }
    }
}
