//! Tilt sampler.
//!
//! Converts raw accelerometer output to degrees each cycle:
//! X and Y scale directly, Z is measured from the resting orientation
//! (the sensor lies flat, so Z reads +1 g at rest):
//!
//! ```text
//! x = raw_x * 90      y = raw_y * 90      z = 90 - raw_z * 90
//! ```
//!
//! All three are published together, then the task idles for the tilt
//! period.  This is the only sampler with an explicit inter-cycle delay.

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::app::ports::{Accelerometer, AxisReading};
use crate::config::SystemConfig;
use crate::power::PowerSwitch;
use crate::telemetry::{TiltAngles, TiltWriter};

/// Raw axes → degrees.
pub fn to_angles(raw: AxisReading, scale_deg: f32) -> TiltAngles {
    TiltAngles {
        x: raw.x * scale_deg,
        y: raw.y * scale_deg,
        z: scale_deg - raw.z * scale_deg,
    }
}

/// Periodic task publishing the tilt triple.
pub struct TiltSampler<A, D> {
    accel: A,
    writer: TiltWriter,
    delay: D,
    scale_deg: f32,
    period_ms: u32,
}

impl<A: Accelerometer, D: DelayNs> TiltSampler<A, D> {
    pub fn new(accel: A, writer: TiltWriter, config: &SystemConfig, delay: D) -> Self {
        Self {
            accel,
            writer,
            delay,
            scale_deg: config.tilt_scale_deg,
            period_ms: config.tilt_period_ms,
        }
    }

    /// One cycle: read, convert, publish, idle.
    pub fn run_cycle(&mut self) -> TiltAngles {
        let angles = to_angles(self.accel.read_axes(), self.scale_deg);
        self.writer.write_tilt(angles.x, angles.y, angles.z);
        debug!("tilt: x={:.1} y={:.1} z={:.1}", angles.x, angles.y, angles.z);
        self.delay.delay_ms(self.period_ms);
        angles
    }

    /// Run until the session is powered off.  Returns the cycle count.
    pub fn run(mut self, power: &PowerSwitch) -> u64 {
        info!("Tilt sampler running (period {} ms)", self.period_ms);
        let mut cycles = 0;
        while power.is_powered() {
            self.run_cycle();
            cycles += 1;
        }
        info!("Tilt sampler stopped after {} cycles", cycles);
        cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::TelemetryStore;

    struct Fixed(AxisReading);
    impl Accelerometer for Fixed {
        fn read_axes(&mut self) -> AxisReading {
            self.0
        }
    }

    struct NoDelay(u32);
    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
        fn delay_ms(&mut self, ms: u32) {
            self.0 += ms;
        }
    }

    #[test]
    fn level_enclosure_reads_zero_on_every_axis() {
        let a = to_angles(AxisReading { x: 0.0, y: 0.0, z: 1.0 }, 90.0);
        assert_eq!(a, TiltAngles { x: 0.0, y: 0.0, z: 0.0 });
    }

    #[test]
    fn z_is_offset_from_rest() {
        let a = to_angles(AxisReading { x: 0.5, y: -0.25, z: 0.5 }, 90.0);
        assert!((a.x - 45.0).abs() < 1e-4);
        assert!((a.y + 22.5).abs() < 1e-4);
        assert!((a.z - 45.0).abs() < 1e-4);
    }

    #[test]
    fn cycle_publishes_then_idles() {
        let (store, _temp, writer) = TelemetryStore::new_shared();
        let mut s = TiltSampler::new(
            Fixed(AxisReading { x: 0.1, y: 0.2, z: 0.9 }),
            writer,
            &SystemConfig::default(),
            NoDelay(0),
        );
        let published = s.run_cycle();
        assert_eq!(store.tilt(), Some(published));
        assert_eq!(s.delay.0, 100);
    }
}
