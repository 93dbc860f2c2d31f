//! Millisecond timers for the cooperative control loop.
//!
//! The platform clock is a `u32` millisecond counter that wraps roughly
//! every 49.7 days.  All comparisons go through [`reached`], which treats
//! the difference as a signed quantity so a deadline armed just before the
//! wrap is still honoured just after it.

/// Monotonic milliseconds since boot, wrapping at `u32::MAX`.
pub type Millis = u32;

/// `true` once `now` is at or past `deadline`, across wraparound.
///
/// Valid as long as the two instants are less than ~24.8 days apart.
pub fn reached(now: Millis, deadline: Millis) -> bool {
    (now.wrapping_sub(deadline) as i32) >= 0
}

/// Fixed-period re-arm timer.
///
/// No exponential growth: each fire re-arms exactly `period_ms` after the
/// instant it was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTimer {
    period_ms: u32,
    deadline: Millis,
}

impl IntervalTimer {
    /// First fire happens one full period after `now`.
    pub fn new(period_ms: u32, now: Millis) -> Self {
        Self {
            period_ms,
            deadline: now.wrapping_add(period_ms),
        }
    }

    /// Timer that fires on the very first poll.
    pub fn immediate(period_ms: u32, now: Millis) -> Self {
        Self {
            period_ms,
            deadline: now,
        }
    }

    /// Returns `true` (and re-arms) if the deadline has been reached.
    pub fn poll(&mut self, now: Millis) -> bool {
        if reached(now, self.deadline) {
            self.deadline = now.wrapping_add(self.period_ms);
            true
        } else {
            false
        }
    }

    /// Push the next fire out to one full period after `now`.
    pub fn rearm(&mut self, now: Millis) {
        self.deadline = now.wrapping_add(self.period_ms);
    }

    /// Make the next [`poll`](Self::poll) fire regardless of elapsed time.
    pub fn expire(&mut self, now: Millis) {
        self.deadline = now;
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    pub fn deadline(&self) -> Millis {
        self.deadline
    }
}
