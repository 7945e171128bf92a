//! Actuation.

pub mod actuator;
