//! Sensor drivers and the two periodic samplers.
//!
//! | Module        | Task                   | Publishes to              |
//! |---------------|------------------------|---------------------------|
//! | `temperature` | [`TemperatureSampler`] | `TelemetryStore` temp     |
//! | `tilt`        | [`TiltSampler`]        | `TelemetryStore` tilt     |
//! | `mma8451q`    | (driver only)          | used by `TiltSampler`     |
//!
//! [`TemperatureSampler`]: temperature::TemperatureSampler
//! [`TiltSampler`]: tilt::TiltSampler

pub mod mma8451q;
pub mod temperature;
pub mod tilt;
