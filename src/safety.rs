//! Fault classifier.
//!
//! The classifier runs on a fixed cadence, compares the latest telemetry
//! against the session's [`ConfigurationProfile`] and latches at most one
//! fault for the whole session.
//!
//! ## Fault lifecycle
//!
//! 1. A threshold is crossed (temperature band or tilt limit).
//! 2. The classifier picks one fault kind according to [`FaultPolicy`]
//!    and records the reading that triggered it.
//! 3. The fault is written into the [`FaultCell`] with a single
//!    compare-and-swap from "no fault".  A latched fault can never be
//!    replaced or cleared.
//! 4. From then on the classifier is a no-op until the session ends.
//!    The only recovery path is a new session.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use log::{error, info};

use crate::config::{ConfigurationProfile, FaultPolicy, SystemConfig};
use crate::power::PowerSwitch;
use crate::telemetry::{TelemetrySnapshot, TelemetryStore};

/// Which threshold was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum FaultKind {
    HighTemp = 1,
    LowTemp = 2,
    TiltX = 3,
    TiltY = 4,
    TiltZ = 5,
}

impl FaultKind {
    fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::HighTemp),
            2 => Some(Self::LowTemp),
            3 => Some(Self::TiltX),
            4 => Some(Self::TiltY),
            5 => Some(Self::TiltZ),
            _ => None,
        }
    }

    /// Short label used on the display.
    pub fn label(self) -> &'static str {
        match self {
            Self::HighTemp => "Tmax",
            Self::LowTemp => "Tmin",
            Self::TiltX => "TiltX",
            Self::TiltY => "TiltY",
            Self::TiltZ => "TiltZ",
        }
    }

    /// Whether the offending value is a temperature (shown with a unit).
    pub fn is_temperature(self) -> bool {
        matches!(self, Self::HighTemp | Self::LowTemp)
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighTemp => write!(f, "maximum temperature exceeded"),
            Self::LowTemp => write!(f, "minimum temperature exceeded"),
            Self::TiltX => write!(f, "X tilt exceeded"),
            Self::TiltY => write!(f, "Y tilt exceeded"),
            Self::TiltZ => write!(f, "Z tilt exceeded"),
        }
    }
}

/// A latched fault and the sensor reading that caused it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fault {
    pub kind: FaultKind,
    pub offending_value: f32,
}

impl Fault {
    fn encode(self) -> u64 {
        (u64::from(self.kind as u32) << 32) | u64::from(self.offending_value.to_bits())
    }

    fn decode(raw: u64) -> Option<Self> {
        FaultKind::from_code((raw >> 32) as u32).map(|kind| Self {
            kind,
            offending_value: f32::from_bits(raw as u32),
        })
    }
}

/// Session-wide fault state: `None` until the first fault, then fixed.
///
/// Kind and value share one 64-bit atomic, so a reader always sees a
/// matching pair.
#[derive(Debug)]
pub struct FaultCell {
    state: AtomicU64,
}

impl FaultCell {
    /// Create an empty cell and its only writer.
    pub fn new_shared() -> (Arc<Self>, FaultLatch) {
        let cell = Arc::new(Self {
            state: AtomicU64::new(0),
        });
        (Arc::clone(&cell), FaultLatch { cell })
    }

    /// Current fault, if any.
    pub fn get(&self) -> Option<Fault> {
        Fault::decode(self.state.load(Ordering::Acquire))
    }

    pub fn is_faulted(&self) -> bool {
        self.get().is_some()
    }
}

/// Sole write handle for a [`FaultCell`].
#[derive(Debug)]
pub struct FaultLatch {
    cell: Arc<FaultCell>,
}

impl FaultLatch {
    /// Record `fault` if no fault has been recorded yet.
    /// Returns `true` if this call latched it.
    pub fn latch(&mut self, fault: Fault) -> bool {
        self.cell
            .state
            .compare_exchange(0, fault.encode(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn cell(&self) -> &Arc<FaultCell> {
        &self.cell
    }
}

/// Evaluate one snapshot against the profile.
///
/// Unsampled fields never trigger a fault.
pub fn classify(
    snap: &TelemetrySnapshot,
    profile: &ConfigurationProfile,
    policy: FaultPolicy,
) -> Option<Fault> {
    let temp_fault = snap.temperature.and_then(|t| {
        if t > profile.max_temp as f32 {
            Some(Fault { kind: FaultKind::HighTemp, offending_value: t })
        } else if t < profile.min_temp as f32 {
            Some(Fault { kind: FaultKind::LowTemp, offending_value: t })
        } else {
            None
        }
    });

    let limit = profile.max_tilt as f32;
    let tilt_fault = snap.tilt.and_then(|a| {
        if a.x > limit {
            Some(Fault { kind: FaultKind::TiltX, offending_value: a.x })
        } else if a.y > limit {
            Some(Fault { kind: FaultKind::TiltY, offending_value: a.y })
        } else if a.z > limit {
            Some(Fault { kind: FaultKind::TiltZ, offending_value: a.z })
        } else {
            None
        }
    });

    match policy {
        FaultPolicy::FirstMatch => temp_fault.or(tilt_fault),
        FaultPolicy::LegacyOverwrite => tilt_fault.or(temp_fault),
    }
}

/// Periodic task that latches the session fault.
pub struct FaultClassifier<D> {
    store: Arc<TelemetryStore>,
    profile: ConfigurationProfile,
    latch: FaultLatch,
    policy: FaultPolicy,
    period_ms: u32,
    delay: D,
}

impl<D: DelayNs> FaultClassifier<D> {
    pub fn new(
        store: Arc<TelemetryStore>,
        profile: ConfigurationProfile,
        latch: FaultLatch,
        config: &SystemConfig,
        delay: D,
    ) -> Self {
        Self {
            store,
            profile,
            latch,
            policy: config.fault_policy,
            period_ms: config.classifier_period_ms,
            delay,
        }
    }

    /// Evaluate once without waiting.  Returns the fault latched by this
    /// call, if any.
    pub fn evaluate(&mut self) -> Option<Fault> {
        if self.latch.cell().is_faulted() {
            return None;
        }
        let snap = self.store.read_snapshot();
        let fault = classify(&snap, &self.profile, self.policy)?;
        if self.latch.latch(fault) {
            error!(
                "SAFETY FAULT LATCHED: {} (value {:.2})",
                fault.kind, fault.offending_value
            );
            Some(fault)
        } else {
            None
        }
    }

    /// One cycle: evaluate, then hold for the classifier period.
    pub fn run_cycle(&mut self) {
        self.evaluate();
        self.delay.delay_ms(self.period_ms);
    }

    /// Run until the session is powered off.  Returns the cycle count.
    pub fn run(mut self, power: &PowerSwitch) -> u64 {
        info!("Fault classifier running (policy={:?})", self.policy);
        let mut cycles = 0;
        while power.is_powered() {
            self.run_cycle();
            cycles += 1;
        }
        info!("Fault classifier stopped after {} cycles", cycles);
        cycles
    }
}
