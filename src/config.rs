//! System configuration parameters
//!
//! [`SystemConfig`] holds the firmware tunables (cadences, filter window,
//! calibration, startup bounds).  [`ConfigurationProfile`] holds the
//! operator thresholds produced by the configuration dialogue; it is set
//! once before monitoring starts and read-only afterwards.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the fault classifier resolves several threshold conditions that
/// become true in the same evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FaultPolicy {
    /// Strict priority: high temp, low temp, tilt X, tilt Y, tilt Z.
    /// The first true condition is the one recorded.
    #[default]
    FirstMatch,
    /// Temperature and tilt groups are evaluated as independent chains and
    /// the tilt group runs second, so a tilt fault replaces a temperature
    /// fault found in the same evaluation.
    LegacyOverwrite,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Temperature sampler ---
    /// Raw samples averaged per published reading.
    pub temp_window_samples: u32,
    /// Delay between raw samples (milliseconds).
    pub temp_sample_interval_ms: u32,
    /// Calibration numerator applied to the averaged raw fraction.
    pub temp_calibration_scale: f32,
    /// Calibration divisor applied to the averaged raw fraction.
    pub temp_calibration_divisor: f32,

    // --- Tilt sampler ---
    /// Degrees per unit of raw accelerometer output.
    pub tilt_scale_deg: f32,
    /// Idle time between tilt cycles (milliseconds).
    pub tilt_period_ms: u32,

    // --- Safety actuator ---
    /// Hold time of each commutation phase, and of each idle re-check.
    pub step_hold_ms: u32,
    /// Actuation starts this many degrees below `max_temp`.
    pub cooling_margin: f32,

    // --- Classifier / reporting ---
    pub classifier_period_ms: u32,
    /// Dwell of each frame in the OK narrative.
    pub report_dwell_ms: u32,
    /// Indicator flash length at OK narrative boundaries.
    pub report_flash_ms: u32,
    /// Dwell of each frame in the fault narrative.
    pub fault_dwell_ms: u32,
    pub fault_policy: FaultPolicy,

    // --- Startup ---
    /// Highest temperature accepted as a plausible first reading.
    pub ready_max_temp: f32,
    /// Highest tilt angle (any axis) accepted as a plausible first reading.
    pub ready_max_tilt: f32,
    /// Bound on each readiness wait; `None` waits forever.
    pub readiness_timeout_ms: Option<u32>,
    /// How long the manual override runs the actuator during self-test.
    pub self_test_ms: u32,
    /// Delay between entering monitoring and arming the power button.
    pub button_arm_delay_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Temperature: 500 x 1 ms block average
            temp_window_samples: 500,
            temp_sample_interval_ms: 1,
            temp_calibration_scale: 350_000.0,
            temp_calibration_divisor: 1024.0,

            // Tilt
            tilt_scale_deg: 90.0,
            tilt_period_ms: 100, // 10 Hz

            // Actuator
            step_hold_ms: 3,
            cooling_margin: 3.0,

            // Classifier / reporting
            classifier_period_ms: 100,
            report_dwell_ms: 1500,
            report_flash_ms: 50,
            fault_dwell_ms: 2000,
            fault_policy: FaultPolicy::FirstMatch,

            // Startup
            ready_max_temp: 80.0,
            ready_max_tilt: 180.0,
            readiness_timeout_ms: Some(30_000),
            self_test_ms: 200,
            button_arm_delay_ms: 3000,
        }
    }
}

/// Operator thresholds for one monitoring session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationProfile {
    pub min_temp: i32,
    pub max_temp: i32,
    /// Maximum tilt (degrees) on any axis.
    pub max_tilt: i32,
    /// Run the actuator preventively when temperature nears `max_temp`.
    pub cooling_control_enabled: bool,
}

impl Default for ConfigurationProfile {
    fn default() -> Self {
        Self {
            min_temp: 0,
            max_temp: 20,
            max_tilt: 10,
            cooling_control_enabled: false,
        }
    }
}

impl ConfigurationProfile {
    /// Check the invariants the configuration dialogue is expected to
    /// maintain.  The monitor itself never rewrites a profile.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_temp >= self.max_temp {
            return Err(ConfigError::ValidationFailed("min_temp must be below max_temp"));
        }
        if self.max_tilt < 0 {
            return Err(ConfigError::ValidationFailed("max_tilt must not be negative"));
        }
        Ok(())
    }

    /// Parse a profile from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|_| ConfigError::Malformed)
    }

    /// Temperature above which cooling control starts the actuator.
    pub fn cooling_threshold(&self, margin: f32) -> f32 {
        self.max_temp as f32 - margin
    }
}

/// Write-once holder for the session profile.
///
/// Tasks started before configuration (the actuator) read it without
/// blocking and see `None` until the dialogue has finished.
#[derive(Debug, Default)]
pub struct ProfileSlot(OnceLock<ConfigurationProfile>);

impl ProfileSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the profile.  Returns `false` if one was already published;
    /// the first profile stays in force.
    pub fn publish(&self, profile: ConfigurationProfile) -> bool {
        self.0.set(profile).is_ok()
    }

    pub fn get(&self) -> Option<&ConfigurationProfile> {
        self.0.get()
    }
}
