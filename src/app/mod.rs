//! Application core: the monitoring session and its collaborators.
//!
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer testable without real peripherals.

pub mod ports;
pub mod report;
pub mod session;
