//! Shared telemetry store.
//!
//! Holds the latest temperature and the three tilt angles.  Each field has
//! exactly one writer task, enforced by the type system: [`TelemetryStore::new_shared`]
//! hands out one [`TemperatureWriter`] and one [`TiltWriter`], neither of
//! which is `Clone`.  Any number of tasks may read through the shared
//! `Arc<TelemetryStore>`.
//!
//! ```text
//! TemperatureSampler ──▶ TemperatureWriter ─┐
//!                                           ├─▶ TelemetryStore ──▶ classifier / actuator / report
//! TiltSampler ─────────▶ TiltWriter ────────┘
//! ```
//!
//! Neither side ever blocks.  The temperature is a single 64-bit atomic
//! (presence tag + `f32` bits).  The tilt triple does not fit in one
//! atomic, so it is published through a sequence counter: the writer makes
//! the counter odd while it stores the three axes and even again when done,
//! and a reader retries if the counter was odd or moved under it.  A reader
//! can see the previous sample, never a mix of two.

use core::hint::spin_loop;
use core::sync::atomic::{AtomicU32, AtomicU64, Ordering, fence};
use std::sync::Arc;

/// Tag bit marking the temperature cell as sampled.
const TEMP_PRESENT: u64 = 1 << 32;

/// Instantaneous tilt of the enclosure, in degrees per axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TiltAngles {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl TiltAngles {
    /// Largest angle across the three axes.
    pub fn max_axis(&self) -> f32 {
        self.x.max(self.y).max(self.z)
    }
}

/// A consistent copy of every field in the store.
///
/// `None` means the field's sampler has not published yet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetrySnapshot {
    pub temperature: Option<f32>,
    pub tilt: Option<TiltAngles>,
}

/// Process-wide latest-value store shared by every task.
#[derive(Debug)]
pub struct TelemetryStore {
    temperature: AtomicU64,
    tilt_seq: AtomicU32,
    tilt_x: AtomicU32,
    tilt_y: AtomicU32,
    tilt_z: AtomicU32,
}

impl TelemetryStore {
    /// Create an empty store together with its only two writers.
    pub fn new_shared() -> (Arc<Self>, TemperatureWriter, TiltWriter) {
        let store = Arc::new(Self {
            temperature: AtomicU64::new(0),
            tilt_seq: AtomicU32::new(0),
            tilt_x: AtomicU32::new(0),
            tilt_y: AtomicU32::new(0),
            tilt_z: AtomicU32::new(0),
        });
        (
            Arc::clone(&store),
            TemperatureWriter { store: Arc::clone(&store) },
            TiltWriter { store },
        )
    }

    /// Latest published temperature.
    pub fn temperature(&self) -> Option<f32> {
        let raw = self.temperature.load(Ordering::Acquire);
        (raw & TEMP_PRESENT != 0).then(|| f32::from_bits(raw as u32))
    }

    /// Latest published tilt triple, never torn.
    pub fn tilt(&self) -> Option<TiltAngles> {
        loop {
            let before = self.tilt_seq.load(Ordering::Acquire);
            if before & 1 == 1 {
                // Writer is mid-update.
                spin_loop();
                continue;
            }
            if before == 0 {
                return None;
            }

            let angles = TiltAngles {
                x: f32::from_bits(self.tilt_x.load(Ordering::Relaxed)),
                y: f32::from_bits(self.tilt_y.load(Ordering::Relaxed)),
                z: f32::from_bits(self.tilt_z.load(Ordering::Relaxed)),
            };

            fence(Ordering::Acquire);
            if self.tilt_seq.load(Ordering::Relaxed) == before {
                return Some(angles);
            }
        }
    }

    /// Copy of all four fields for classification or reporting.
    ///
    /// Temperature and tilt may come from different sampler generations;
    /// only the tilt triple is guaranteed to be from a single write.
    pub fn read_snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            temperature: self.temperature(),
            tilt: self.tilt(),
        }
    }
}

/// Sole write handle for the temperature field.
#[derive(Debug)]
pub struct TemperatureWriter {
    store: Arc<TelemetryStore>,
}

impl TemperatureWriter {
    /// Replace the published temperature.
    pub fn write_temperature(&mut self, value: f32) {
        let raw = TEMP_PRESENT | u64::from(value.to_bits());
        self.store.temperature.store(raw, Ordering::Release);
    }
}

/// Sole write handle for the three tilt fields.
#[derive(Debug)]
pub struct TiltWriter {
    store: Arc<TelemetryStore>,
}

impl TiltWriter {
    /// Replace all three tilt angles as one unit.
    pub fn write_tilt(&mut self, x: f32, y: f32, z: f32) {
        let s = &self.store;
        // `&mut self` on the only writer: no other thread touches tilt_seq
        // for writing, so a plain load/store pair is enough.
        let seq = s.tilt_seq.load(Ordering::Relaxed);
        s.tilt_seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        s.tilt_x.store(x.to_bits(), Ordering::Relaxed);
        s.tilt_y.store(y.to_bits(), Ordering::Relaxed);
        s.tilt_z.store(z.to_bits(), Ordering::Relaxed);

        // Skip 0 on wrap-around: it means "never written".
        let mut next = seq.wrapping_add(2);
        if next == 0 {
            next = 2;
        }
        s.tilt_seq.store(next, Ordering::Release);
    }
}
