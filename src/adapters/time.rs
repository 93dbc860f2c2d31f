//! Monotonic millisecond clock.
//!
//! - **`target_os = "espidf"`** — `esp_timer_get_time()` (microseconds
//!   since boot) truncated to a wrapping `u32` millisecond count.
//! - **`not(target_os = "espidf")`** — `std::time::Instant`, plus an
//!   offset so host tests can start the clock just below the wrap.

use crate::app::ports::Clock;
use crate::timer::Millis;

pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
    #[cfg(not(target_os = "espidf"))]
    offset: Millis,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
            #[cfg(not(target_os = "espidf"))]
            offset: 0,
        }
    }

    /// Clock whose first reading is `offset` (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn starting_at(offset: Millis) -> Self {
        Self {
            start: std::time::Instant::now(),
            offset,
        }
    }
}

impl Clock for MonotonicClock {
    #[cfg(target_os = "espidf")]
    fn now_ms(&self) -> Millis {
        // SAFETY: reads the free-running esp_timer counter.
        let us = unsafe { esp_idf_sys::esp_timer_get_time() };
        (us / 1_000) as Millis
    }

    #[cfg(not(target_os = "espidf"))]
    fn now_ms(&self) -> Millis {
        let elapsed = self.start.elapsed().as_millis() as Millis;
        self.offset.wrapping_add(elapsed)
    }
}
