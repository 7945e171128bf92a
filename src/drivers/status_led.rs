//! RGB status LED driver.
//!
//! Three LEDC PWM channels drive a common-anode RGB LED, so a channel is
//! lit while its line is low: intensity 1.0 is duty 0, intensity 0.0 is
//! duty 255.  Callers only see intensities through the [`Indicator`] port.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the LEDC duty registers via hw_init.
//! On host/test: hw_init records the duties in memory.

use crate::app::ports::{Indicator, Rgb};
use crate::drivers::hw_init;

/// Intensity in `[0, 1]` → inverted 8-bit duty.
fn active_low_duty(intensity: f32) -> u8 {
    let on = intensity.clamp(0.0, 1.0);
    ((1.0 - on) * 255.0).round() as u8
}

pub struct StatusLed {
    current: Rgb,
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLed {
    pub fn new() -> Self {
        Self { current: Rgb::OFF }
    }

    pub fn current_colour(&self) -> Rgb {
        self.current
    }
}

impl Indicator for StatusLed {
    fn set(&mut self, colour: Rgb) {
        hw_init::ledc_set(hw_init::LEDC_CH_LED_R, active_low_duty(colour.r));
        hw_init::ledc_set(hw_init::LEDC_CH_LED_G, active_low_duty(colour.g));
        hw_init::ledc_set(hw_init::LEDC_CH_LED_B, active_low_duty(colour.b));
        self.current = colour;
    }
}
