//! Linear brightness ramps
//!
//! A ramp moves an 8-bit level from the value it had when the ramp was
//! started to a target value, linearly over a fixed duration. Progress is
//! accumulated from the wall-clock delta between ticks, so a ramp never
//! overshoots and always lands exactly on its target.

use embassy_time::{Duration, Instant};

/// Longest ramp a channel can run (the persisted width is 16 bits of ms).
pub const MAX_RAMP: Duration = Duration::from_millis(u16::MAX as u64);

/// Interpolate between `from` and `to` after `elapsed` of `duration`.
///
/// Integer math, truncating toward zero, so the result is always between
/// `from` and `to` inclusive.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn interpolate(from: u8, to: u8, elapsed: Duration, duration: Duration) -> u8 {
    let duration_ms = duration.as_millis();
    if duration_ms == 0 {
        return to;
    }
    let elapsed_ms = if elapsed.as_millis() < duration_ms {
        elapsed.as_millis()
    } else {
        duration_ms
    };

    let delta = to as i64 - from as i64;
    let value = from as i64 + delta * elapsed_ms as i64 / duration_ms as i64;
    value as u8
}

/// Level ramp state for a single output
#[derive(Debug, Clone)]
pub struct Ramp {
    /// Level currently emitted
    current: u8,
    /// Level at the moment the ramp was (re)started
    original: u8,
    /// Level the ramp converges to
    target: u8,
    /// Total ramp duration, zero when instantaneous or finished
    duration: Duration,
    /// Progress accumulated within the current ramp
    elapsed: Duration,
    /// Time of the last progress update
    last_update: Instant,
}

impl Ramp {
    /// Create a settled ramp at `initial`
    pub const fn new(initial: u8) -> Self {
        Self {
            current: initial,
            original: initial,
            target: initial,
            duration: Duration::from_millis(0),
            elapsed: Duration::from_millis(0),
            last_update: Instant::from_millis(0),
        }
    }

    pub const fn current(&self) -> u8 {
        self.current
    }

    pub const fn original(&self) -> u8 {
        self.original
    }

    pub const fn target(&self) -> u8 {
        self.target
    }

    pub const fn duration(&self) -> Duration {
        self.duration
    }

    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Check if the output still has to move
    pub fn is_ramping(&self) -> bool {
        self.current != self.target
    }

    /// Ramp progress in percent, 100 when no timed ramp is running
    #[allow(clippy::cast_possible_truncation)]
    pub const fn progress_percent(&self) -> u8 {
        let duration_ms = self.duration.as_millis();
        if duration_ms == 0 {
            return 100;
        }
        let percent = self.elapsed.as_millis() * 100 / duration_ms;
        if percent > 100 { 100 } else { percent as u8 }
    }

    /// Start a new ramp from the current level
    ///
    /// A ramp already in progress is re-anchored at whatever level it has
    /// reached, it never jumps to its previous target first.
    pub fn set(&mut self, target: u8, duration: Duration, now: Instant) {
        self.original = self.current;
        self.target = target;
        self.duration = if duration > MAX_RAMP { MAX_RAMP } else { duration };
        self.elapsed = Duration::from_millis(0);
        self.last_update = now;
    }

    /// Advance the ramp to `now`
    ///
    /// Returns `true` if the emitted level changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let previous = self.current;

        if self.current == self.target {
            // Nothing to move, a requested ramp to the same level is done
            self.clear();
            return false;
        }

        if self.duration.as_millis() == 0 {
            self.current = self.target;
            return self.current != previous;
        }

        let delta = now
            .checked_duration_since(self.last_update)
            .unwrap_or(Duration::from_millis(0));
        self.elapsed += delta;

        if self.elapsed >= self.duration {
            self.current = self.target;
            self.clear();
        } else {
            self.current = interpolate(self.original, self.target, self.elapsed, self.duration);
            self.last_update = now;
        }

        self.current != previous
    }

    fn clear(&mut self) {
        self.duration = Duration::from_millis(0);
        self.elapsed = Duration::from_millis(0);
    }
}

impl Default for Ramp {
    fn default() -> Self {
        Self::new(0)
    }
}
