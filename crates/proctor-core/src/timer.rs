//! Integer-second countdown for timed sessions.

/// Remaining seconds at which the one-time low-time warning fires.
pub const LOW_TIME_THRESHOLD_SECS: u32 = 120;

/// Events a tick can produce. Each fires at most once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Remaining time crossed [`LOW_TIME_THRESHOLD_SECS`].
    LowTime,
    /// The countdown reached zero.
    Expired,
}

/// Single-writer countdown driven by external ticks.
///
/// Ticks only decrement while the timer is running; once the countdown
/// reaches zero every further tick is a no-op, so expiry-triggered
/// auto-submission can never fire twice.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    remaining: u32,
    running: bool,
    low_warned: bool,
    expired: bool,
}

impl CountdownTimer {
    /// Start a countdown at `total_seconds`. Zero means untimed: the
    /// timer idles and never expires.
    pub fn new(total_seconds: u32) -> Self {
        Self {
            remaining: total_seconds,
            running: total_seconds > 0,
            low_warned: false,
            expired: false,
        }
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_expired(&self) -> bool {
        self.expired
    }

    /// Suspend the countdown (entering submission).
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Resume after a failed submission. A finished countdown stays
    /// finished.
    pub fn resume(&mut self) {
        if !self.expired && self.remaining > 0 {
            self.running = true;
        }
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running || self.remaining == 0 {
            return None;
        }

        self.remaining -= 1;

        if self.remaining == 0 {
            self.expired = true;
            self.running = false;
            return Some(TimerEvent::Expired);
        }

        if self.remaining <= LOW_TIME_THRESHOLD_SECS && !self.low_warned {
            self.low_warned = true;
            return Some(TimerEvent::LowTime);
        }

        None
    }
}
