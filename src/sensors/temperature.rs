//! Analog temperature sensor and its windowed-average sampler.
//!
//! The sampler takes a block of raw readings at a fixed interval, averages
//! them and applies a linear calibration:
//!
//! ```text
//! temperature = mean(raw[0..N]) / divisor * scale      (N = 500, 1 ms apart)
//! ```
//!
//! The block average is the low-pass filter; there is no further
//! filtering.  When porting to a front-end with a different scale keep the
//! block average and retune `scale` / `divisor`.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: [`AdcTemperatureInput`] reads ADC1 via the oneshot API
//! (initialised by hw_init).  On host/test: it reads a static `AtomicU32`
//! for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU32, Ordering};

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::app::ports::TemperatureInput;
use crate::config::SystemConfig;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::power::PowerSwitch;
use crate::telemetry::TemperatureWriter;

#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_FRACTION: AtomicU32 = AtomicU32::new(0);

/// Inject the raw fraction returned by [`AdcTemperatureInput`] on host.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temp_fraction(fraction: f32) {
    SIM_TEMP_FRACTION.store(fraction.to_bits(), Ordering::Relaxed);
}

#[cfg(target_os = "espidf")]
const ADC_MAX: f32 = 4095.0;

/// Temperature front-end wired to an ADC1 channel.
pub struct AdcTemperatureInput {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    channel: u32,
}

impl AdcTemperatureInput {
    pub fn new(channel: u32) -> Self {
        Self { channel }
    }

    #[cfg(target_os = "espidf")]
    fn read_hw(&self) -> f32 {
        f32::from(hw_init::adc1_read(self.channel)) / ADC_MAX
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_hw(&self) -> f32 {
        f32::from_bits(SIM_TEMP_FRACTION.load(Ordering::Relaxed))
    }
}

impl TemperatureInput for AdcTemperatureInput {
    fn read_fraction(&mut self) -> f32 {
        self.read_hw()
    }
}

/// Periodic task publishing the windowed-average temperature.
pub struct TemperatureSampler<I, D> {
    input: I,
    writer: TemperatureWriter,
    delay: D,
    window: u32,
    interval_ms: u32,
    scale: f32,
    divisor: f32,
}

impl<I: TemperatureInput, D: DelayNs> TemperatureSampler<I, D> {
    pub fn new(input: I, writer: TemperatureWriter, config: &SystemConfig, delay: D) -> Self {
        Self {
            input,
            writer,
            delay,
            window: config.temp_window_samples.max(1),
            interval_ms: config.temp_sample_interval_ms,
            scale: config.temp_calibration_scale,
            divisor: config.temp_calibration_divisor,
        }
    }

    /// Mean raw fraction over one window.  Waits `interval_ms` after every
    /// sample, so a window costs `window * interval_ms`.
    pub fn sample_window(&mut self) -> f32 {
        let mut sum = 0.0_f64;
        for _ in 0..self.window {
            sum += f64::from(self.input.read_fraction());
            self.delay.delay_ms(self.interval_ms);
        }
        (sum / f64::from(self.window)) as f32
    }

    /// Convert a mean raw fraction into instrument units.
    pub fn calibrate(&self, mean_fraction: f32) -> f32 {
        mean_fraction / self.divisor * self.scale
    }

    /// One cycle: sample a window, calibrate, publish.  Returns the value
    /// published.  There is no delay beyond the window itself.
    pub fn run_cycle(&mut self) -> f32 {
        let mean = self.sample_window();
        let temperature = self.calibrate(mean);
        self.writer.write_temperature(temperature);
        debug!("temp: mean={:.5} -> {:.2}", mean, temperature);
        temperature
    }

    /// Run until the session is powered off.  Returns the cycle count.
    pub fn run(mut self, power: &PowerSwitch) -> u64 {
        info!(
            "Temperature sampler running ({} samples x {} ms)",
            self.window, self.interval_ms
        );
        let mut cycles = 0;
        while power.is_powered() {
            self.run_cycle();
            cycles += 1;
        }
        info!("Temperature sampler stopped after {} cycles", cycles);
        cycles
    }
}
