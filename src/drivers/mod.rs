//! Board drivers, hardware initialisation and task spawning.

pub mod button;
pub mod hw_init;
pub mod status_led;
pub mod stepper;
pub mod task_pin;
