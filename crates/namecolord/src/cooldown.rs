use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Last successful color change per connected player.
///
/// Absent means clear: a player who never changed, or who left and
/// rejoined, is never on cooldown. Entries are removed on leave so the
/// table only tracks connected players. Nothing persists across restarts.
#[derive(Debug, Default)]
pub struct CooldownTable {
    last_change: HashMap<String, Instant>,
}

impl CooldownTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time left before `player` may change again, `None` when clear.
    /// Read-only; a failed attempt does not extend the cooldown.
    pub fn remaining(&self, player: &str, now: Instant, cooldown: Duration) -> Option<Duration> {
        let last = self.last_change.get(player)?;
        let elapsed = now.saturating_duration_since(*last);
        if elapsed < cooldown {
            Some(cooldown - elapsed)
        } else {
            None
        }
    }

    /// Called exactly once per successful change, after validation and
    /// before the role side effects go out.
    pub fn note_change(&mut self, player: &str, now: Instant) {
        self.last_change.insert(player.to_string(), now);
    }

    pub fn clear(&mut self, player: &str) {
        self.last_change.remove(player);
    }
}

/// Round up to whole seconds so the user doesn't retry too early.
pub fn remaining_seconds(d: Duration) -> u64 {
    let ms = d.as_millis();
    if ms == 0 {
        0
    } else {
        let s = (ms + 999) / 1000;
        u64::try_from(s).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::{remaining_seconds, CooldownTable};
    use std::time::{Duration, Instant};

    #[test]
    fn halfway_through_reports_half_remaining() {
        let cooldown = Duration::from_secs(60);
        let t0 = Instant::now();
        let mut t = CooldownTable::new();
        t.note_change("Alice", t0);

        let left = t
            .remaining("Alice", t0 + Duration::from_millis(30_000), cooldown)
            .expect("on cooldown");
        assert_eq!(remaining_seconds(left), 30);
    }

    #[test]
    fn expires_at_the_boundary() {
        let cooldown = Duration::from_secs(60);
        let t0 = Instant::now();
        let mut t = CooldownTable::new();
        t.note_change("Alice", t0);

        assert!(t
            .remaining("Alice", t0 + Duration::from_millis(60_000), cooldown)
            .is_none());
        assert!(t
            .remaining("Alice", t0 + Duration::from_millis(90_000), cooldown)
            .is_none());
    }

    #[test]
    fn absent_player_is_never_on_cooldown() {
        let t = CooldownTable::new();
        assert!(t
            .remaining("Nobody", Instant::now(), Duration::from_secs(60))
            .is_none());
    }

    #[test]
    fn clear_resets_immediately() {
        let cooldown = Duration::from_secs(60);
        let t0 = Instant::now();
        let mut t = CooldownTable::new();
        t.note_change("Alice", t0);
        t.clear("Alice");
        assert!(t
            .remaining("Alice", t0 + Duration::from_millis(1), cooldown)
            .is_none());
    }

    #[test]
    fn display_seconds_round_up() {
        assert_eq!(remaining_seconds(Duration::from_millis(0)), 0);
        assert_eq!(remaining_seconds(Duration::from_millis(1)), 1);
        assert_eq!(remaining_seconds(Duration::from_millis(29_500)), 30);
        assert_eq!(remaining_seconds(Duration::from_millis(30_000)), 30);
    }
}
