use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hostproto::HostEvent;
use tracing::{error, info, warn, Level};

mod batch;
mod catalog;
mod commands;
mod cooldown;
mod host;
mod palette;

use catalog::RoleCatalog;
use commands::ChangePlan;
use cooldown::CooldownTable;
use palette::Palette;

fn usage_and_exit() -> ! {
    eprintln!(
        "namecolord (name-color role daemon)\n\n\
USAGE:\n  namecolord [--roles PATH] [--cooldown-s N]\n\n\
ENV:\n  NAMECOLOR_ROLES_PATH        optional; default roles.txt\n  NAMECOLOR_COOLDOWN_S        optional; default 60\n  NAMECOLOR_JOIN_DELAY_MS     optional; default 500\n  NAMECOLOR_MSG_MAX_BYTES     optional; default 512\n  NAMECOLOR_HOST_CTL_SOCK     optional; default /run/namecolor/host-ctl.sock\n  NAMECOLOR_HOST_EVENTS_SOCK  optional; default /run/namecolor/host-events.sock\n"
    );
    std::process::exit(2);
}

#[derive(Clone, Debug)]
struct Config {
    roles_path: PathBuf,
    cooldown: Duration,
    join_delay: Duration,
    msg_max_bytes: usize,
    ctl_sock: PathBuf,
    events_sock: PathBuf,
}

fn parse_args() -> Config {
    let mut roles_path: PathBuf = std::env::var("NAMECOLOR_ROLES_PATH")
        .unwrap_or_else(|_| "roles.txt".to_string())
        .into();
    let mut cooldown_s: u64 = std::env::var("NAMECOLOR_COOLDOWN_S")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60);
    let join_delay_ms: u64 = std::env::var("NAMECOLOR_JOIN_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(500);
    let msg_max_bytes: usize = std::env::var("NAMECOLOR_MSG_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(512);
    let ctl_sock: PathBuf = std::env::var("NAMECOLOR_HOST_CTL_SOCK")
        .unwrap_or_else(|_| "/run/namecolor/host-ctl.sock".to_string())
        .into();
    let events_sock: PathBuf = std::env::var("NAMECOLOR_HOST_EVENTS_SOCK")
        .unwrap_or_else(|_| "/run/namecolor/host-events.sock".to_string())
        .into();

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--roles" => {
                roles_path = it.next().unwrap_or_else(|| usage_and_exit()).into();
            }
            "--cooldown-s" => {
                cooldown_s = it
                    .next()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(|| usage_and_exit());
            }
            "-h" | "--help" => usage_and_exit(),
            _ => usage_and_exit(),
        }
    }

    Config {
        roles_path,
        cooldown: Duration::from_secs(cooldown_s),
        join_delay: Duration::from_millis(join_delay_ms),
        msg_max_bytes,
        ctl_sock,
        events_sock,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,namecolord=info".into()),
        )
        .with_target(false)
        .with_max_level(Level::INFO)
        .init();

    let cfg = parse_args();

    let catalog = RoleCatalog::load(&cfg.roles_path)?;
    if catalog.is_empty() {
        warn!(path = %cfg.roles_path.display(), "roles file contains no roles; nothing will be assignable");
    }

    let host_roles = host::fetch_role_setup(&cfg.ctl_sock).await?;
    let palette = match Palette::resolve(&catalog, &host_roles) {
        Ok(p) => p,
        Err(e) => {
            error!(err = %e, "host role setup does not match the roles file");
            return Err(e.into());
        }
    };

    let batches = batch::batch_listing(&catalog, &palette, cfg.msg_max_bytes);

    host::register_commands(&cfg.ctl_sock, &["changecolor", "namecolors"]).await?;
    info!(
        roles = catalog.len(),
        listing_chunks = batches.len(),
        cooldown_s = cfg.cooldown.as_secs(),
        "registered commands: changecolor, namecolors"
    );

    let catalog = Arc::new(catalog);
    let palette = Arc::new(palette);
    let batches = Arc::new(batches);
    let cooldowns: Arc<tokio::sync::Mutex<CooldownTable>> =
        Arc::new(tokio::sync::Mutex::new(CooldownTable::new()));

    let (event_tx, mut event_rx) = tokio::sync::mpsc::channel::<HostEvent>(1024);
    tokio::spawn(host::events_task(cfg.events_sock.clone(), event_tx));

    while let Some(ev) = event_rx.recv().await {
        match ev {
            HostEvent::Join { player } => {
                let cfg = cfg.clone();
                let catalog = catalog.clone();
                tokio::spawn(async move {
                    handle_join(cfg, catalog, player).await;
                });
            }
            HostEvent::Leave { player } => {
                cooldowns.lock().await.clear(&player);
            }
            HostEvent::Command {
                name,
                speaker,
                args,
                trusted,
            } => match name.as_str() {
                "changecolor" => {
                    let requested = args.first().map(String::as_str).unwrap_or("");
                    handle_changecolor(&cfg, &catalog, &palette, &cooldowns, &speaker, requested)
                        .await;
                }
                "namecolors" => {
                    handle_namecolors(&cfg, &batches, &speaker, trusted).await;
                }
                _ => {}
            },
        }
    }

    Ok(())
}

/// Runs detached so the wait never blocks the event loop.
async fn handle_join(cfg: Config, catalog: Arc<RoleCatalog>, player: String) {
    // Heuristic wait for the host to finish registering the player; the
    // host offers no readiness signal to await instead.
    tokio::time::sleep(cfg.join_delay).await;

    if catalog.is_empty() {
        return;
    }

    let held = match host::fetch_player_roles(&cfg.ctl_sock, &player).await {
        Ok(Some(r)) => r,
        Ok(None) => return, // left during the wait
        Err(e) => {
            warn!(err = %e, player, "player role lookup failed after join");
            return;
        }
    };
    if held.iter().any(|r| catalog.contains(r)) {
        return;
    }

    let Some(role) = pick_random(catalog.names()) else {
        return;
    };
    for line in commands::join_intro_lines() {
        host::whisper(&cfg.ctl_sock, &player, line).await;
    }
    host::grant_role(&cfg.ctl_sock, role, &player).await;
}

async fn handle_changecolor(
    cfg: &Config,
    catalog: &RoleCatalog,
    palette: &Palette,
    cooldowns: &tokio::sync::Mutex<CooldownTable>,
    speaker: &str,
    requested: &str,
) {
    let plan = {
        let mut table = cooldowns.lock().await;
        commands::plan_change(
            palette,
            &mut table,
            speaker,
            requested,
            Instant::now(),
            cfg.cooldown,
        )
    };

    match plan {
        ChangePlan::Ignore => {}
        ChangePlan::OnCooldown { reply }
        | ChangePlan::Restricted { reply }
        | ChangePlan::NotFound { reply } => {
            host::whisper(&cfg.ctl_sock, speaker, &reply).await;
        }
        ChangePlan::Proceed { role, reply } => {
            let held = match host::fetch_player_roles(&cfg.ctl_sock, speaker).await {
                Ok(Some(r)) => r,
                Ok(None) => return, // left mid-command
                Err(e) => {
                    warn!(err = %e, speaker, "player role lookup failed");
                    return;
                }
            };
            // Normally at most one, but clean up however many slipped in.
            for r in held.iter().filter(|r| catalog.contains(r)) {
                host::revoke_role(&cfg.ctl_sock, r, speaker).await;
            }
            host::grant_role(&cfg.ctl_sock, &role, speaker).await;
            host::whisper(&cfg.ctl_sock, speaker, &reply).await;
        }
    }
}

async fn handle_namecolors(cfg: &Config, batches: &[String], speaker: &str, trusted: bool) {
    if !trusted {
        host::whisper(&cfg.ctl_sock, speaker, commands::LIST_DENIED).await;
        return;
    }
    host::whisper(&cfg.ctl_sock, speaker, commands::LIST_HEADER).await;
    host::whisper(&cfg.ctl_sock, speaker, commands::LIST_USAGE).await;
    for b in batches {
        host::whisper(&cfg.ctl_sock, speaker, b).await;
    }
}

fn pick_random(names: &[String]) -> Option<&String> {
    if names.is_empty() {
        return None;
    }
    let mut b = [0u8; 8];
    getrandom::getrandom(&mut b).ok()?;
    let idx = (u64::from_be_bytes(b) % names.len() as u64) as usize;
    names.get(idx)
}

#[cfg(test)]
mod tests {
    use super::pick_random;

    #[test]
    fn pick_random_stays_in_bounds() {
        assert!(pick_random(&[]).is_none());

        let one = vec!["Red".to_string()];
        assert_eq!(pick_random(&one), Some(&one[0]));

        let names = ["Red", "Green", "Blue"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        for _ in 0..64 {
            let p = pick_random(&names).expect("non-empty");
            assert!(names.contains(p));
        }
    }
}
