//! GPIO / peripheral pin assignments for the CargaSEG monitor board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Temperature front-end (analog, ADC1)
// ---------------------------------------------------------------------------

/// Conditioned temperature sensor output.
/// ADC1 channel 8 (GPIO 9 on ESP32-S3).
pub const TEMP_ADC_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// MMA8451Q accelerometer (I²C)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;
/// Bus clock for the accelerometer.
pub const I2C_FREQ_HZ: u32 = 400_000;

// ---------------------------------------------------------------------------
// Stepper driver (4-phase unipolar, ULN2003-style, active LOW)
// ---------------------------------------------------------------------------

/// Coil lines in commutation order.  A coil is energised while its line
/// is LOW.
pub const COIL_GPIOS: [i32; 4] = [4, 5, 6, 7];

// ---------------------------------------------------------------------------
// Status LED (discrete RGB, common anode: a channel is lit while LOW)
// ---------------------------------------------------------------------------

pub const LED_R_GPIO: i32 = 11;
pub const LED_G_GPIO: i32 = 12;
pub const LED_B_GPIO: i32 = 13;
/// LEDC frequency for the status LED (1 kHz).
pub const LED_PWM_FREQ_HZ: u32 = 1_000;

// ---------------------------------------------------------------------------
// Power button (active HIGH with external pull-down)
// ---------------------------------------------------------------------------

/// Momentary push-button; a rising edge ends the session once armed.
pub const BUTTON_GPIO: i32 = 16;
