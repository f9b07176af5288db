//! The per-question countdown.

/// Seconds shown at the start of every question.
pub const DEFAULT_COUNTDOWN_START: u32 = 26;

/// A countdown from `start` to zero, one step per tick.
///
/// Each peer owns its own countdown; the only synchronization with other
/// peers is that everyone resets to the same start value when a question
/// arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    start: u32,
    remaining: u32,
    stopped: bool,
}

impl Countdown {
    /// Creates a countdown that begins at `start`.
    pub fn new(start: u32) -> Self {
        Self {
            start,
            remaining: start,
            stopped: false,
        }
    }

    /// Decrements by one. Returns the new value, or `None` when nothing
    /// changed (already at zero, or stopped).
    pub fn tick(&mut self) -> Option<u32> {
        if self.stopped || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.remaining)
    }

    /// Back to the start value. A stopped countdown stays stopped.
    pub fn reset(&mut self) {
        self.remaining = self.start;
    }

    /// Freezes the countdown; later ticks are no-ops.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Current value.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// The value `reset` returns to.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// `true` once the countdown reached zero.
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN_START)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_starts_at_26() {
        let c = Countdown::default();
        assert_eq!(c.remaining(), 26);
        assert_eq!(c.start(), 26);
        assert!(!c.is_expired());
    }

    #[test]
    fn test_tick_counts_down_to_zero_and_stays() {
        let mut c = Countdown::new(3);
        assert_eq!(c.tick(), Some(2));
        assert_eq!(c.tick(), Some(1));
        assert_eq!(c.tick(), Some(0));
        assert!(c.is_expired());
        // Floor at zero: further ticks change nothing.
        assert_eq!(c.tick(), None);
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn test_reset_returns_to_start() {
        let mut c = Countdown::new(26);
        for _ in 0..10 {
            c.tick();
        }
        assert_eq!(c.remaining(), 16);
        c.reset();
        assert_eq!(c.remaining(), 26);
    }

    #[test]
    fn test_stop_freezes_value() {
        let mut c = Countdown::new(5);
        c.tick();
        c.stop();
        assert_eq!(c.tick(), None);
        assert_eq!(c.remaining(), 4);
        assert!(c.is_stopped());
    }
}
