use embassy_time::{Duration, Instant};

/// One-shot absolute deadline polled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OneShotTimer {
    deadline: Option<Instant>,
}

impl OneShotTimer {
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arm the timer at `deadline`, replacing any previous deadline
    pub fn arm(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    /// Arm the timer `delay` after `now`
    pub fn arm_after(&mut self, now: Instant, delay: Duration) {
        self.arm(now + delay);
    }

    pub const fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fire once when the deadline has been reached, disarming the timer
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Whole seconds left before the deadline, zero when disarmed or due
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        self.deadline
            .and_then(|deadline| deadline.checked_duration_since(now))
            .map_or(0, |left| left.as_secs())
    }
}
