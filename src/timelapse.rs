//! Time-lapse cadence.
//!
//! The scheduler only answers "is a shot due now?"; taking the shot and
//! handling its failure belongs to the caller.  Clock readings come from
//! a monotonic millisecond source and are passed in by the caller, which
//! keeps this module free of any timer or radio dependency.

use crate::config::{
    TIMELAPSE_DEFAULT_INTERVAL_MS, TIMELAPSE_MAX_INTERVAL_MS, TIMELAPSE_MIN_INTERVAL_MS,
    TIMELAPSE_STEP_MS,
};
use crate::error::Error;

/// Allowed interval range and step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalBounds {
    pub min: u64,
    pub max: u64,
    pub step: u64,
}

impl IntervalBounds {
    /// Bounds used by the firmware.
    pub const DEFAULT: Self = Self {
        min: TIMELAPSE_MIN_INTERVAL_MS,
        max: TIMELAPSE_MAX_INTERVAL_MS,
        step: TIMELAPSE_STEP_MS,
    };

    fn clamp(&self, value: u64) -> u64 {
        value.clamp(self.min, self.max)
    }
}

pub struct IntervalScheduler {
    bounds: IntervalBounds,
    interval: u64,
    armed: bool,
    /// Clock reading of the last due (or arm) event.
    last_due: u64,
}

impl IntervalScheduler {
    /// Scheduler with the firmware bounds and default interval.
    pub fn new() -> Self {
        Self::with_bounds(IntervalBounds::DEFAULT, TIMELAPSE_DEFAULT_INTERVAL_MS)
    }

    /// `interval` is clamped into `bounds`.
    pub fn with_bounds(bounds: IntervalBounds, interval: u64) -> Self {
        Self {
            bounds,
            interval: bounds.clamp(interval),
            armed: false,
            last_due: 0,
        }
    }

    pub fn current_interval(&self) -> u64 {
        self.interval
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Flip `armed` and return the new state.
    pub fn toggle_arm(&mut self, now_ms: u64) -> bool {
        self.armed = !self.armed;
        if self.armed {
            self.last_due = now_ms;
        }
        info!("Time-lapse armed={} interval={} ms", self.armed, self.interval);
        self.armed
    }

    pub fn disarm(&mut self) {
        if self.armed {
            info!("Time-lapse disarmed");
            self.armed = false;
        }
    }

    /// Lengthen the interval by one step and return it.
    ///
    /// At `max` this is a no-op returning `max`.  Rejected while armed.
    pub fn increment_interval(&mut self) -> Result<u64, Error> {
        let next = self.interval.saturating_add(self.bounds.step);
        self.adjust(next)
    }

    /// Shorten the interval by one step and return it.
    ///
    /// At `min` this is a no-op returning `min`.  Rejected while armed.
    pub fn decrement_interval(&mut self) -> Result<u64, Error> {
        let next = self.interval.saturating_sub(self.bounds.step);
        self.adjust(next)
    }

    fn adjust(&mut self, requested: u64) -> Result<u64, Error> {
        if self.armed {
            warn!("Interval change ignored while armed");
            return Err(Error::IntervalLocked);
        }
        let next = self.bounds.clamp(requested);
        if next == self.interval {
            debug!("{}: {} ms", Error::IntervalAtBound, self.interval);
        }
        self.interval = next;
        Ok(next)
    }

    /// True when a shot is due.  Call once per tick.
    ///
    /// Fires at most once per `interval` since the last due or arm event;
    /// never fires while unarmed.
    pub fn poll_due(&mut self, now_ms: u64) -> bool {
        if !self.armed {
            return false;
        }
        if now_ms.saturating_sub(self.last_due) >= self.interval {
            self.last_due = now_ms;
            return true;
        }
        false
    }
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new()
    }
}
