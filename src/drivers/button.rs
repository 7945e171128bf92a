//! Power button ISR glue.
//!
//! ## Hardware
//!
//! Active-high momentary switch with external pull-down.  The GPIO fires
//! on the rising edge; the ISR passes the edge through a time-based
//! debounce filter and then to the session's [`PowerSwitch`], which
//! ignores it until monitoring has started.
//!
//! The ISR cannot capture state, so the switch is registered once in a
//! static with [`attach`].

use core::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use log::warn;

use crate::power::PowerSwitch;

const DEBOUNCE_MS: u32 = 50;

static POWER_SWITCH: OnceLock<Arc<PowerSwitch>> = OnceLock::new();
static BUTTON_FILTER: EdgeFilter = EdgeFilter::new(DEBOUNCE_MS);

/// Drops edges that follow the previously accepted one too closely.
#[derive(Debug)]
pub struct EdgeFilter {
    /// Timestamp of the last accepted edge + 1, or 0 if none yet.
    last_plus_one: AtomicU32,
    window_ms: u32,
}

impl EdgeFilter {
    pub const fn new(window_ms: u32) -> Self {
        Self {
            last_plus_one: AtomicU32::new(0),
            window_ms,
        }
    }

    /// `true` if the edge at `now_ms` is a new press.  Lock-free.
    pub fn accept(&self, now_ms: u32) -> bool {
        let prev = self.last_plus_one.load(Ordering::Acquire);
        if prev != 0 && now_ms.wrapping_sub(prev.wrapping_sub(1)) < self.window_ms {
            return false;
        }
        self.last_plus_one
            .store(now_ms.wrapping_add(1).max(1), Ordering::Release);
        true
    }
}

/// Route button edges to `power`.  Only the first call takes effect.
pub fn attach(power: Arc<PowerSwitch>) -> bool {
    let ok = POWER_SWITCH.set(power).is_ok();
    if !ok {
        warn!("Power button already attached; ignoring");
    }
    ok
}

/// ISR handler: register this on the button GPIO rising edge.
/// Returns `true` if the edge ended the session.
pub fn button_isr_handler(now_ms: u32) -> bool {
    if !BUTTON_FILTER.accept(now_ms) {
        return false;
    }
    POWER_SWITCH.get().is_some_and(|p| p.on_rising_edge())
}
