//! Unified error types for the CargaSEG firmware.
//!
//! Sensor readings that cross a threshold are *not* errors: they are
//! business faults latched by [`crate::safety`].  The types here cover the
//! things that can actually go wrong around the monitoring engine: a sensor
//! that never becomes ready, a task that cannot be created or that panics,
//! and a configuration profile that cannot be produced.
//!
//! All variants are `Copy` so they can be passed between tasks without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The monitoring session could not be brought up.
    Startup(StartupError),
    /// The configuration profile is unavailable or malformed.
    Config(ConfigError),
    /// A periodic task panicked; detected at the shutdown join.
    TaskPanicked(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Startup(e) => write!(f, "startup: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::TaskPanicked(name) => write!(f, "task '{name}' panicked"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Startup errors
// ---------------------------------------------------------------------------

/// Which sensor a readiness wait was blocked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Temperature,
    Accelerometer,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "temperature sensor"),
            Self::Accelerometer => write!(f, "accelerometer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupError {
    /// The sensor did not publish a plausible reading before the
    /// readiness timeout expired.
    SensorNotReady(SensorKind),
    /// The OS refused to create the named task.
    Spawn(&'static str),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorNotReady(kind) => write!(f, "{kind} not ready"),
            Self::Spawn(name) => write!(f, "could not spawn task '{name}'"),
        }
    }
}

impl From<StartupError> for Error {
    fn from(e: StartupError) -> Self {
        Self::Startup(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from [`ProfileSource`](crate::app::ports::ProfileSource)
/// implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A profile field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// The serialized profile could not be parsed.
    Malformed,
    /// The configuration dialogue was abandoned before completion.
    Cancelled,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Malformed => write!(f, "malformed profile"),
            Self::Cancelled => write!(f, "configuration cancelled"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
