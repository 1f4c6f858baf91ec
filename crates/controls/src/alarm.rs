//! One-shot alarms
//!
//! An [`Alarm`] is a deadline, not a running timer: its owner asks
//! [`Alarm::take_expired`] when it wakes up, and computes its next wake-up
//! from [`Alarm::deadline`]. Nothing fires behind the owner's back.

use embassy_time::{Duration, Instant};

/// A start/stop-able one-shot deadline with a fixed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alarm {
    period: Duration,
    deadline: Option<Instant>,
}

impl Alarm {
    /// Stopped alarm that, once started, expires after `period`.
    pub const fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    /// Period the alarm was created with.
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// (Re)start the alarm so it expires one period after `now`.
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now.checked_add(self.period).unwrap_or(Instant::MAX));
    }

    /// Stop the alarm. Stopping a stopped alarm does nothing.
    pub fn stop(&mut self) {
        self.deadline = None;
    }

    /// `true` between `start` and expiry or `stop`.
    pub const fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// Expiry instant of a running alarm.
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Stop the alarm and return `true` if it is due at `now`.
    pub fn take_expired(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_once_after_period() {
        let mut alarm = Alarm::new(Duration::from_millis(250));
        alarm.start(Instant::from_millis(100));
        assert_eq!(alarm.deadline(), Some(Instant::from_millis(350)));
        assert!(!alarm.take_expired(Instant::from_millis(349)));
        assert!(alarm.take_expired(Instant::from_millis(350)));
        assert!(!alarm.is_running());
        assert!(!alarm.take_expired(Instant::from_millis(400)));
    }

    #[test]
    fn stop_cancels_expiry() {
        let mut alarm = Alarm::new(Duration::from_millis(10));
        alarm.start(Instant::from_millis(0));
        alarm.stop();
        assert!(!alarm.take_expired(Instant::from_millis(50)));
    }

    #[test]
    fn restart_moves_deadline() {
        let mut alarm = Alarm::new(Duration::from_millis(10));
        alarm.start(Instant::from_millis(0));
        alarm.start(Instant::from_millis(5));
        assert_eq!(alarm.deadline(), Some(Instant::from_millis(15)));
    }
}
