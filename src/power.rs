//! Session power flag and power-button handling.
//!
//! Every periodic task checks [`PowerSwitch::is_powered`] at the top of
//! its loop and exits after finishing the cycle in progress once the flag
//! clears.  The flag is cleared by a rising edge on the power button, but
//! only after the session has armed the switch (edges during startup and
//! configuration belong to the configuration dialogue).
//!
//! ```text
//! button ISR ──▶ on_rising_edge() ──(armed?)──▶ powered = false
//!                                                  │
//!        temp / tilt / actuator / classifier / report loops observe it
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use log::info;

/// Lock-free, ISR-safe cancellation flag shared by every task.
#[derive(Debug)]
pub struct PowerSwitch {
    powered: AtomicBool,
    armed: AtomicBool,
    /// Last level seen by [`poll_level`](Self::poll_level).
    last_level: AtomicBool,
}

impl Default for PowerSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerSwitch {
    /// A powered, unarmed switch.
    pub const fn new() -> Self {
        Self {
            powered: AtomicBool::new(true),
            armed: AtomicBool::new(false),
            last_level: AtomicBool::new(false),
        }
    }

    pub fn is_powered(&self) -> bool {
        self.powered.load(Ordering::Acquire)
    }

    /// Let button edges shut the session down from now on.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::Release);
        info!("Power button armed");
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Clear the powered flag unconditionally (startup failure, tests).
    pub fn power_off(&self) {
        self.powered.store(false, Ordering::Release);
    }

    /// Button rising edge.  Safe to call from interrupt context.
    /// Returns `true` if this edge ended the session.
    pub fn on_rising_edge(&self) -> bool {
        if !self.armed.load(Ordering::Acquire) {
            return false;
        }
        self.powered.swap(false, Ordering::AcqRel)
    }

    /// Feed the current button level; a low→high transition is treated as
    /// a rising edge.  For buttons that are polled rather than wired to an
    /// interrupt.
    pub fn poll_level(&self, high: bool) -> bool {
        let was_high = self.last_level.swap(high, Ordering::AcqRel);
        if high && !was_high {
            self.on_rising_edge()
        } else {
            false
        }
    }
}
