//! Hardware adapter: bridges the board's peripherals to the port traits.
//!
//! Assembles the [`SessionHardware`] bundle for the CargaSEG board.  This
//! is the only place the concrete drivers are chosen; on non-espidf
//! targets they fall back to the hw_init simulation stubs, so the same
//! bundle runs on the host with any `embedded_hal` I²C bus.

use embedded_hal::i2c::I2c;

use crate::adapters::log_display::LogDisplay;
use crate::app::session::SessionHardware;
use crate::drivers::hw_init;
use crate::drivers::status_led::StatusLed;
use crate::drivers::stepper::GpioCoils;
use crate::sensors::mma8451q::{self, Mma8451q};
use crate::sensors::temperature::AdcTemperatureInput;

/// Concrete hardware of one board.
pub type BoardHardware<I2C> =
    SessionHardware<AdcTemperatureInput, Mma8451q<I2C>, GpioCoils, LogDisplay, StatusLed>;

/// Bring up the accelerometer on `i2c` and bundle it with the on-chip
/// peripherals configured by `hw_init::init_peripherals()`.
pub fn board_hardware<I2C: I2c>(i2c: I2C) -> Result<BoardHardware<I2C>, I2C::Error> {
    let accelerometer = Mma8451q::new(i2c, mma8451q::DEFAULT_ADDRESS)?;
    Ok(SessionHardware {
        temperature: AdcTemperatureInput::new(hw_init::ADC1_CH_TEMP),
        accelerometer,
        coils: GpioCoils::new(),
        display: LogDisplay::new(),
        indicator: StatusLed::new(),
    })
}
