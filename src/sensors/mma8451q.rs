//! NXP MMA8451Q three-axis accelerometer on I²C.
//!
//! Runs in the default ±2 g range, 14-bit output: each axis is a
//! left-justified big-endian pair, 4096 counts per g.  Any bus that
//! implements `embedded_hal::i2c::I2c` works (esp-idf-hal's `I2cDriver` on
//! target, an in-memory register file in tests).
//!
//! Read failures are logged and the previous good reading is returned; a
//! flaky bus must not stop the tilt sampler.

use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::{Accelerometer, AxisReading};

/// Default 7-bit address (SA0 pulled high).
pub const DEFAULT_ADDRESS: u8 = 0x1D;

const REG_OUT_X_MSB: u8 = 0x01;
const REG_WHO_AM_I: u8 = 0x0D;
const REG_CTRL_REG1: u8 = 0x2A;

const WHO_AM_I_VALUE: u8 = 0x1A;
const CTRL_REG1_ACTIVE: u8 = 0x01;
const COUNTS_PER_G: f32 = 4096.0;

pub struct Mma8451q<I2C> {
    i2c: I2C,
    address: u8,
    last: AxisReading,
}

impl<I2C: I2c> Mma8451q<I2C> {
    /// Put the device in active mode.
    pub fn new(i2c: I2C, address: u8) -> Result<Self, I2C::Error> {
        let mut dev = Self {
            i2c,
            address,
            last: AxisReading::default(),
        };
        let id = dev.who_am_i()?;
        if id != WHO_AM_I_VALUE {
            warn!("MMA8451Q: unexpected WHO_AM_I 0x{:02X}", id);
        }
        dev.i2c.write(address, &[REG_CTRL_REG1, CTRL_REG1_ACTIVE])?;
        info!("MMA8451Q active at 0x{:02X}", address);
        Ok(dev)
    }

    pub fn who_am_i(&mut self) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.address, &[REG_WHO_AM_I], &mut buf)?;
        Ok(buf[0])
    }

    /// Burst-read all three axes, in g.
    pub fn read_g(&mut self) -> Result<AxisReading, I2C::Error> {
        let mut buf = [0u8; 6];
        self.i2c.write_read(self.address, &[REG_OUT_X_MSB], &mut buf)?;
        Ok(AxisReading {
            x: axis_to_g(buf[0], buf[1]),
            y: axis_to_g(buf[2], buf[3]),
            z: axis_to_g(buf[4], buf[5]),
        })
    }
}

fn axis_to_g(msb: u8, lsb: u8) -> f32 {
    // 14-bit two's complement, left-justified in 16 bits.
    let counts = i16::from_be_bytes([msb, lsb]) >> 2;
    f32::from(counts) / COUNTS_PER_G
}

impl<I2C: I2c> Accelerometer for Mma8451q<I2C> {
    fn read_axes(&mut self) -> AxisReading {
        match self.read_g() {
            Ok(reading) => {
                self.last = reading;
                reading
            }
            Err(e) => {
                warn!("MMA8451Q read failed ({:?}), keeping last reading", e);
                self.last
            }
        }
    }
}
