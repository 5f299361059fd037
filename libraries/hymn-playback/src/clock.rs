//! Progress clock
//!
//! One clock per session. It does not own a timer itself: whoever drives it
//! (the async driver, or a test) delivers elapsed time through
//! `Session::tick` together with the `ClockLease` it was handed when the
//! clock was acquired.
//!
//! Every acquire or release bumps the generation, which invalidates all
//! earlier leases. A tick that arrives with a stale lease (after a pause, a
//! stop or a track change) is ignored, so a late timer can never move the
//! position of a different track or trigger a second auto-advance.

use std::time::Duration;

/// Proof of clock ownership for one playing stretch of one track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockLease(u64);

impl ClockLease {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct ProgressClock {
    generation: u64,
    running: bool,

    /// Set once auto-advance fired for the current track
    advanced: bool,

    /// Fraction of the duration that counts as "finished"
    near_completion: f64,

    interval: Duration,
}

impl ProgressClock {
    pub fn new(interval: Duration, near_completion: f64) -> Self {
        let near_completion = if near_completion.is_finite() {
            near_completion.clamp(0.0, 1.0)
        } else {
            1.0
        };

        Self {
            generation: 0,
            running: false,
            advanced: false,
            near_completion,
            interval,
        }
    }

    /// Start ticking, invalidating any previous lease
    pub fn acquire(&mut self) -> ClockLease {
        self.generation += 1;
        self.running = true;
        ClockLease(self.generation)
    }

    /// Stop ticking, invalidating the outstanding lease
    pub fn release(&mut self) {
        if self.running {
            self.generation += 1;
            self.running = false;
        }
    }

    /// New track loaded: clear the auto-advance guard
    pub fn reset_track(&mut self) {
        self.advanced = false;
    }

    /// Lease of the running clock, if any
    pub fn lease(&self) -> Option<ClockLease> {
        self.running.then_some(ClockLease(self.generation))
    }

    /// Whether a tick carrying `lease` may be applied
    pub fn accepts(&self, lease: ClockLease) -> bool {
        self.running && lease.0 == self.generation
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn near_completion(&self) -> f64 {
        self.near_completion
    }

    /// Advance a position by `elapsed` seconds, clamped to `[0, duration]`
    pub fn advance(position: f64, elapsed: f64, duration: f64) -> f64 {
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        (position + elapsed).clamp(0.0, duration.max(0.0))
    }

    /// Check both completion conditions against the single guard
    ///
    /// Returns true at most once per track, whichever of "reached the
    /// duration" and "reached the near-completion threshold" is seen first.
    /// Unknown (zero) durations never complete.
    pub fn take_auto_advance(&mut self, position: f64, duration: f64) -> bool {
        if self.advanced || duration <= 0.0 {
            return false;
        }

        let reached_end = position >= duration;
        let near_end = position >= duration * self.near_completion;

        if reached_end || near_end {
            self.advanced = true;
            return true;
        }

        false
    }

    /// Whether auto-advance already fired for the current track
    pub fn has_advanced(&self) -> bool {
        self.advanced
    }
}

impl Default for ProgressClock {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 0.995)
    }
}
