//! Fuzz target: MMA8451Q register decoding
//!
//! Serves arbitrary bytes as the accelerometer's register file and checks:
//! - No panics for any register contents, WHO_AM_I included
//! - Every axis decodes to a finite value inside the ±2 g range
//!
//! cargo fuzz run fuzz_accel_registers

#![no_main]

use cargoseg::app::ports::Accelerometer;
use cargoseg::sensors::mma8451q::{DEFAULT_ADDRESS, Mma8451q};
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
use libfuzzer_sys::fuzz_target;

struct Regs {
    file: [u8; 0x40],
    ptr: usize,
}

impl ErrorType for Regs {
    type Error = ErrorKind;
}

impl I2c for Regs {
    fn transaction(&mut self, _addr: u8, ops: &mut [Operation<'_>]) -> Result<(), ErrorKind> {
        for op in ops {
            match op {
                Operation::Write(bytes) => {
                    let Some((&reg, rest)) = bytes.split_first() else {
                        continue;
                    };
                    self.ptr = usize::from(reg) % self.file.len();
                    for &b in rest {
                        self.file[self.ptr] = b;
                        self.ptr = (self.ptr + 1) % self.file.len();
                    }
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.file[self.ptr];
                        self.ptr = (self.ptr + 1) % self.file.len();
                    }
                }
            }
        }
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let mut file = [0u8; 0x40];
    let n = data.len().min(file.len());
    file[..n].copy_from_slice(&data[..n]);

    let Ok(mut accel) = Mma8451q::new(Regs { file, ptr: 0 }, DEFAULT_ADDRESS) else {
        return;
    };
    let r = accel.read_axes();
    for g in [r.x, r.y, r.z] {
        assert!(g.is_finite());
        assert!((-2.0..2.0).contains(&g), "{g} g out of range");
    }
});
