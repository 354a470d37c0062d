/// Cooldown debounce for one alert channel.
///
/// Two fires are never closer together than `cooldown_ms`. The first fire is
/// always allowed.
#[derive(Debug, Clone)]
pub struct AlertGate {
    cooldown_ms: u64,
    last_fired_ms: Option<u64>,
}

impl AlertGate {
    #[must_use]
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms,
            last_fired_ms: None,
        }
    }

    /// Records a fire at `now_ms` and returns true if the cooldown has elapsed.
    pub fn try_fire(&mut self, now_ms: u64) -> bool {
        let ready = self
            .last_fired_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.cooldown_ms);
        if ready {
            self.last_fired_ms = Some(now_ms);
        }
        ready
    }

    #[must_use]
    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }

    #[must_use]
    pub fn last_fired_ms(&self) -> Option<u64> {
        self.last_fired_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_fire_is_allowed() {
        let mut gate = AlertGate::new(2_000);
        assert!(gate.try_fire(0));
        assert_eq!(gate.last_fired_ms(), Some(0));
    }

    #[test]
    fn fires_are_spaced_by_cooldown() {
        let mut gate = AlertGate::new(2_000);
        assert!(gate.try_fire(1_000));
        assert!(!gate.try_fire(2_999));
        assert!(gate.try_fire(3_000));
        assert!(!gate.try_fire(4_000));
    }

    #[test]
    fn refused_fire_does_not_move_the_window() {
        let mut gate = AlertGate::new(1_000);
        assert!(gate.try_fire(0));
        assert!(!gate.try_fire(900));
        assert!(gate.try_fire(1_000));
    }
}
