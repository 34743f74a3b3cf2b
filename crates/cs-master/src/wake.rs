//! Periodic wake sources for the scheduler.
//!
//! The controller polls its wake source from [`Controller::pump`]. Hosts
//! that already own a timer can skip the wake entirely and call
//! [`Controller::tick`] themselves.
//!
//! [`Controller::pump`]: crate::Controller::pump
//! [`Controller::tick`]: crate::Controller::tick

use std::time::{Duration, Instant};

/// A cancellable periodic wake.
pub trait WakeSource {
    /// Start firing every `interval`. Re-arming restarts the period.
    fn arm(&mut self, interval: Duration);

    /// Stop firing. Pending wakes are discarded.
    fn cancel(&mut self);

    /// Consume one wake if it is due.
    fn fired(&mut self) -> bool;

    fn is_armed(&self) -> bool;
}

/// Wall-clock wake. Missed periods collapse into one.
#[derive(Debug, Default)]
pub struct IntervalWake {
    interval: Duration,
    next: Option<Instant>,
}

impl IntervalWake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time left until the next wake, or `None` when disarmed.
    pub fn until_next(&self) -> Option<Duration> {
        self.next.map(|next| next.saturating_duration_since(Instant::now()))
    }
}

impl WakeSource for IntervalWake {
    fn arm(&mut self, interval: Duration) {
        self.interval = interval;
        self.next = Some(Instant::now() + interval);
    }

    fn cancel(&mut self) {
        self.next = None;
    }

    fn fired(&mut self) -> bool {
        let Some(next) = self.next else {
            return false;
        };
        let now = Instant::now();
        if now < next {
            return false;
        }
        let mut following = next + self.interval;
        if following <= now {
            following = now + self.interval;
        }
        self.next = Some(following);
        true
    }

    fn is_armed(&self) -> bool {
        self.next.is_some()
    }
}

/// Wake fired by hand, for deterministic tests and offline rendering.
#[derive(Debug, Default)]
pub struct ManualWake {
    armed: bool,
    pending: u32,
}

impl ManualWake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one wake. Ignored while disarmed.
    pub fn trigger(&mut self) {
        if self.armed {
            self.pending = self.pending.saturating_add(1);
        }
    }
}

impl WakeSource for ManualWake {
    fn arm(&mut self, _interval: Duration) {
        self.armed = true;
        self.pending = 0;
    }

    fn cancel(&mut self) {
        self.armed = false;
        self.pending = 0;
    }

    fn fired(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        self.pending -= 1;
        true
    }

    fn is_armed(&self) -> bool {
        self.armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_wake_only_fires_when_armed() {
        let mut wake = ManualWake::new();
        wake.trigger();
        assert!(!wake.fired());

        wake.arm(Duration::from_millis(25));
        wake.trigger();
        wake.trigger();
        assert!(wake.fired());
        assert!(wake.fired());
        assert!(!wake.fired());

        wake.trigger();
        wake.cancel();
        assert!(!wake.fired());
    }

    #[test]
    fn interval_wake_fires_after_its_period() {
        let mut wake = IntervalWake::new();
        assert!(!wake.fired());
        assert_eq!(wake.until_next(), None);

        wake.arm(Duration::ZERO);
        assert!(wake.fired());

        wake.arm(Duration::from_secs(3600));
        assert!(!wake.fired());
        assert!(wake.until_next().is_some_and(|d| d > Duration::from_secs(3000)));

        wake.cancel();
        assert!(!wake.is_armed());
    }
}
