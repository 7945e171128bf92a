//! Port traits: the boundary between the monitoring engine and the
//! collaborators it does not own.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ samplers / actuator / report / session
//! ```
//!
//! Display, indicator LED, accelerometer, analog temperature front-end and
//! the configuration dialogue are all external.  The engine talks to them
//! only through these traits, so every task runs against mocks on the host.
//!
//! Time is the one collaborator that is not defined here: every task takes
//! an [`embedded_hal::delay::DelayNs`] and that is its only suspension point.

use embedded_hal::digital::PinState;

use crate::app::report::Frame;
use crate::config::ConfigurationProfile;
use crate::error::ConfigError;
use crate::telemetry::TelemetrySnapshot;

// ───────────────────────────────────────────────────────────────
// Sensor ports (hardware → engine)
// ───────────────────────────────────────────────────────────────

/// Analog temperature front-end.
pub trait TemperatureInput {
    /// One raw reading as a fraction of full scale, nominally `[0, 1]`.
    fn read_fraction(&mut self) -> f32;
}

/// Raw accelerometer output, one value per axis, nominally `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisReading {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Three-axis accelerometer.
pub trait Accelerometer {
    fn read_axes(&mut self) -> AxisReading;
}

// ───────────────────────────────────────────────────────────────
// Actuator / output ports (engine → hardware)
// ───────────────────────────────────────────────────────────────

/// The four binary outputs of the unipolar stepper driver.
pub trait CoilDriver {
    /// Drive all four coil lines at once, index 0 first.
    fn drive(&mut self, levels: [PinState; 4]);
}

/// Two-line text display.  Each call clears and redraws.
pub trait Display {
    fn show(&mut self, frame: &Frame);
}

/// Indicator colour, each channel an intensity in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const OFF: Self = Self::new(0.0, 0.0, 0.0);
    pub const RED: Self = Self::new(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0);
    /// Short "all good" flash between report cycles.
    pub const STATUS_FLASH: Self = Self::new(0.0, 0.5, 0.0);
    /// Steady colour while a fault narrative is on screen.
    pub const FAULT: Self = Self::new(0.5, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Tri-colour status indicator.
pub trait Indicator {
    fn set(&mut self, colour: Rgb);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (dialogue → engine)
// ───────────────────────────────────────────────────────────────

/// Produces the operator profile for a session.
///
/// The interactive dialogue implements this: it may take as long as the
/// operator needs, and it may show the current readings (hence the
/// snapshot).  It is called exactly once per session.
pub trait ProfileSource {
    fn obtain(&mut self, current: &TelemetrySnapshot) -> Result<ConfigurationProfile, ConfigError>;
}

/// Three-way gesture derived from the touch slider position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchGesture {
    Decrease,
    Neutral,
    Increase,
}

impl TouchGesture {
    /// Classify a raw slider position: right of 25 increases, between 1
    /// and 15 decreases, anything else (including no touch) is neutral.
    pub fn from_position(position: f32) -> Self {
        if position > 25.0 {
            Self::Increase
        } else if position < 15.0 && position > 1.0 {
            Self::Decrease
        } else {
            Self::Neutral
        }
    }

    /// Step applied to the value being edited.
    pub fn delta(self) -> i32 {
        match self {
            Self::Decrease => -1,
            Self::Neutral => 0,
            Self::Increase => 1,
        }
    }
}
