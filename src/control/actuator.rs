//! Safety actuator: 4-phase unipolar stepper drive.
//!
//! Each cycle checks the activation condition
//!
//! ```text
//! (cooling_control_enabled && temperature > max_temp - margin) || manual_override
//! ```
//!
//! and either advances one commutation phase or drives the idle pattern.
//! Both branches hold for `step_hold_ms` (3 ms), so the idle re-check runs
//! at the stepping cadence.
//!
//! The actuator starts before the operator profile exists (it runs the
//! self-test).  Until the profile is published cooling control counts as
//! disabled and only the override can start it.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use log::{debug, info};

use crate::app::ports::CoilDriver;
use crate::config::{ConfigurationProfile, ProfileSlot, SystemConfig};
use crate::power::PowerSwitch;
use crate::telemetry::TelemetryStore;

use PinState::{High, Low};

/// Coil levels per phase: phase `p` pulls coil `p` low.
pub const COMMUTATION: [[PinState; 4]; 4] = [
    [Low, High, High, High],
    [High, Low, High, High],
    [High, High, Low, High],
    [High, High, High, Low],
];

/// Every coil released.
pub const IDLE: [PinState; 4] = [High; 4];

/// Externally settable "run now" flag.
#[derive(Debug, Default)]
pub struct OverrideFlag(AtomicBool);

impl OverrideFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Whether the actuator should be stepping.  A missing profile or an
/// unsampled temperature leaves only the override.
pub fn activation_condition(
    profile: Option<&ConfigurationProfile>,
    temperature: Option<f32>,
    manual_override: bool,
    margin: f32,
) -> bool {
    let cooling = match (profile, temperature) {
        (Some(p), Some(t)) => p.cooling_control_enabled && t > p.cooling_threshold(margin),
        _ => false,
    };
    cooling || manual_override
}

/// Periodic stepper task.  Sole owner of the commutation phase.
pub struct SafetyActuator<C, D> {
    coils: C,
    store: Arc<TelemetryStore>,
    profile: Arc<ProfileSlot>,
    manual_override: Arc<OverrideFlag>,
    delay: D,
    phase: u8,
    margin: f32,
    hold_ms: u32,
}

impl<C: CoilDriver, D: DelayNs> SafetyActuator<C, D> {
    pub fn new(
        coils: C,
        store: Arc<TelemetryStore>,
        profile: Arc<ProfileSlot>,
        manual_override: Arc<OverrideFlag>,
        config: &SystemConfig,
        delay: D,
    ) -> Self {
        Self {
            coils,
            store,
            profile,
            manual_override,
            delay,
            phase: 0,
            margin: config.cooling_margin,
            hold_ms: config.step_hold_ms,
        }
    }

    /// Phase the next active cycle will drive.
    pub fn phase(&self) -> u8 {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        activation_condition(
            self.profile.get(),
            self.store.temperature(),
            self.manual_override.is_set(),
            self.margin,
        )
    }

    /// One cycle: step or idle, then hold.  Returns whether it stepped.
    pub fn run_cycle(&mut self) -> bool {
        let active = self.is_active();
        if active {
            self.coils.drive(COMMUTATION[usize::from(self.phase)]);
            self.phase = (self.phase + 1) % 4;
        } else {
            self.coils.drive(IDLE);
            self.phase = 0;
        }
        self.delay.delay_ms(self.hold_ms);
        active
    }

    /// Run until the session is powered off.  Returns the cycle count.
    pub fn run(mut self, power: &PowerSwitch) -> u64 {
        info!("Safety actuator running (hold {} ms)", self.hold_ms);
        let mut cycles = 0;
        let mut was_active = false;
        while power.is_powered() {
            let active = self.run_cycle();
            if active != was_active {
                debug!("actuator {}", if active { "stepping" } else { "idle" });
                was_active = active;
            }
            cycles += 1;
        }
        self.coils.drive(IDLE);
        info!("Safety actuator stopped after {} cycles", cycles);
        cycles
    }
}
