//! Stepper coil driver (4-phase unipolar, active-low).
//!
//! Writes the four coil lines through hw_init in commutation order.  The
//! actuator decides the levels; this driver is a dumb output stage.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: `gpio_set_level` via hw_init.
//! On host/test: hw_init records the levels in memory.

use embedded_hal::digital::PinState;

use crate::app::ports::CoilDriver;
use crate::drivers::hw_init;
use crate::pins;

pub struct GpioCoils {
    gpios: [i32; 4],
}

impl Default for GpioCoils {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioCoils {
    /// Coils on the board's default lines.
    pub fn new() -> Self {
        Self::with_pins(pins::COIL_GPIOS)
    }

    pub fn with_pins(gpios: [i32; 4]) -> Self {
        Self { gpios }
    }
}

impl CoilDriver for GpioCoils {
    fn drive(&mut self, levels: [PinState; 4]) {
        for (&gpio, level) in self.gpios.iter().zip(levels) {
            hw_init::gpio_write(gpio, level == PinState::High);
        }
    }
}
