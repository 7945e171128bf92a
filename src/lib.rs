//! CargaSEG cargo-enclosure monitor library.
//!
//! Exposes the monitoring engine and its drivers for integration testing.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod power;
pub mod safety;
pub mod telemetry;

pub mod pins;

pub mod adapters;
pub mod control;
pub mod drivers;
pub mod sensors;

pub use error::{Error, Result};
