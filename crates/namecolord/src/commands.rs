use std::time::{Duration, Instant};

use crate::cooldown::{remaining_seconds, CooldownTable};
use crate::palette::Palette;

pub const LIST_HEADER: &str = "Current color roles:";
pub const LIST_USAGE: &str = "Use <code>/changecolor [color]</> to change a player's name color.";
pub const LIST_DENIED: &str = "Only the host can list name colors.";

/// Whispered once to a freshly joined player after random assignment.
pub fn join_intro_lines() -> [&'static str; 2] {
    [
        "You have been assigned a random colored role!",
        "Use <code>/namecolors</> to see all available colors, and <code>/changecolor [color]</> to change it.",
    ]
}

/// What the dispatcher should do with a `changecolor` request.
///
/// Checks short-circuit in this order: empty request, cooldown,
/// restricted role, unknown role. Only `Proceed` mutates the cooldown
/// table, and it does so before any host round-trip goes out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangePlan {
    /// Empty request: drop it without a reply.
    Ignore,
    OnCooldown { reply: String },
    Restricted { reply: String },
    NotFound { reply: String },
    Proceed { role: String, reply: String },
}

pub fn plan_change(
    palette: &Palette,
    cooldowns: &mut CooldownTable,
    speaker: &str,
    requested: &str,
    now: Instant,
    cooldown: Duration,
) -> ChangePlan {
    if requested.is_empty() {
        return ChangePlan::Ignore;
    }

    if let Some(left) = cooldowns.remaining(speaker, now, cooldown) {
        let clock = fmt_mmss(remaining_seconds(left));
        return ChangePlan::OnCooldown {
            reply: format!("You are on cooldown! <color=\"ffff00\">{clock}</> remaining."),
        };
    }

    if palette.is_restricted(requested) {
        return ChangePlan::Restricted {
            reply: "<color=\"ff0000\">That role cannot be assigned. <emoji>contempt</>".to_string(),
        };
    }

    let Some(hex) = palette.color_of(requested) else {
        return ChangePlan::NotFound {
            reply: "Cannot find that color. <color=\"edf263\">Ensure it's spelt correctly, role names are case-sensitive</>!".to_string(),
        };
    };

    // Stamp before the grant/revoke round-trips so a slow host can't be
    // farmed for rapid retries.
    cooldowns.note_change(speaker, now);

    ChangePlan::Proceed {
        role: requested.to_string(),
        reply: format!("Updated your role color to <color=\"{hex}\">{requested}</>!"),
    }
}

pub fn fmt_mmss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::{fmt_mmss, plan_change, ChangePlan};
    use crate::catalog::RoleCatalog;
    use crate::cooldown::CooldownTable;
    use crate::palette::Palette;
    use hostproto::{RgbColor, RoleDef};
    use std::time::{Duration, Instant};

    const COOLDOWN: Duration = Duration::from_secs(60);

    fn palette() -> Palette {
        let catalog = RoleCatalog::parse("#\nRed\nSea Green");
        let host = vec![
            RoleDef {
                name: "Red".to_string(),
                color: RgbColor { r: 255, g: 0, b: 0 },
            },
            RoleDef {
                name: "Sea Green".to_string(),
                color: RgbColor {
                    r: 46,
                    g: 139,
                    b: 87,
                },
            },
            RoleDef {
                name: "Moderator".to_string(),
                color: RgbColor { r: 9, g: 9, b: 9 },
            },
        ];
        Palette::resolve(&catalog, &host).unwrap()
    }

    #[test]
    fn empty_request_is_silently_ignored() {
        let p = palette();
        let mut cd = CooldownTable::new();
        let t0 = Instant::now();
        assert_eq!(
            plan_change(&p, &mut cd, "Alice", "", t0, COOLDOWN),
            ChangePlan::Ignore
        );
        // No stamp was recorded.
        assert!(cd.remaining("Alice", t0 + Duration::from_secs(1), COOLDOWN).is_none());
    }

    #[test]
    fn proceed_stamps_the_cooldown() {
        let p = palette();
        let mut cd = CooldownTable::new();
        let t0 = Instant::now();

        match plan_change(&p, &mut cd, "Alice", "Red", t0, COOLDOWN) {
            ChangePlan::Proceed { role, reply } => {
                assert_eq!(role, "Red");
                assert!(reply.contains("<color=\"ff0000\">Red</>"));
            }
            other => panic!("unexpected plan: {other:?}"),
        }

        let again = plan_change(
            &p,
            &mut cd,
            "Alice",
            "Sea Green",
            t0 + Duration::from_millis(30_000),
            COOLDOWN,
        );
        match again {
            ChangePlan::OnCooldown { reply } => assert!(reply.contains("00:30")),
            other => panic!("unexpected plan: {other:?}"),
        }

        // Once the window passes, the change goes through again.
        let later = plan_change(
            &p,
            &mut cd,
            "Alice",
            "Sea Green",
            t0 + Duration::from_millis(60_000),
            COOLDOWN,
        );
        assert!(matches!(later, ChangePlan::Proceed { .. }));
    }

    #[test]
    fn restricted_role_rejected_without_a_stamp() {
        let p = palette();
        let mut cd = CooldownTable::new();
        let t0 = Instant::now();

        let plan = plan_change(&p, &mut cd, "Alice", "mODERATOr", t0, COOLDOWN);
        assert!(matches!(plan, ChangePlan::Restricted { .. }));
        assert!(cd.remaining("Alice", t0 + Duration::from_secs(1), COOLDOWN).is_none());
    }

    #[test]
    fn catalog_match_is_case_sensitive() {
        let p = palette();
        let mut cd = CooldownTable::new();
        let plan = plan_change(&p, &mut cd, "Alice", "red", Instant::now(), COOLDOWN);
        assert!(matches!(plan, ChangePlan::NotFound { .. }));
    }

    #[test]
    fn mmss_formats_with_padding() {
        assert_eq!(fmt_mmss(0), "00:00");
        assert_eq!(fmt_mmss(30), "00:30");
        assert_eq!(fmt_mmss(61), "01:01");
        assert_eq!(fmt_mmss(600), "10:00");
    }
}
