//! Delay adapter.
//!
//! Every task suspends only through `embedded_hal::delay::DelayNs`.  On
//! ESP-IDF `std::thread::sleep` maps to a FreeRTOS delay, so the same
//! adapter serves the firmware and host simulation.  Tests substitute
//! their own `DelayNs` to run without waiting.

use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// Blocking delay backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl StdDelay {
    pub fn new() -> Self {
        Self
    }
}

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
