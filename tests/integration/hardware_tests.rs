//! Board bundle on the host: real drivers over the hw_init simulation and
//! an in-memory MMA8451Q.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cargoseg::adapters::hardware::board_hardware;
use cargoseg::adapters::profile::JsonProfile;
use cargoseg::adapters::time::StdDelay;
use cargoseg::app::ports::{Accelerometer, AxisReading, TemperatureInput};
use cargoseg::app::session::MonitorSession;
use cargoseg::drivers::hw_init;
use cargoseg::pins;
use cargoseg::power::PowerSwitch;
use cargoseg::sensors::temperature::sim_set_temp_fraction;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};

use crate::mock_hw::{FakeMma8451q, LEVEL, fast_config, fraction_for};

/// A bus with nothing on it.
struct EmptyBus;

impl ErrorType for EmptyBus {
    type Error = ErrorKind;
}

impl I2c for EmptyBus {
    fn transaction(&mut self, _address: u8, _ops: &mut [Operation<'_>]) -> Result<(), ErrorKind> {
        Err(ErrorKind::NoAcknowledge(embedded_hal::i2c::NoAcknowledgeSource::Address))
    }
}

#[test]
fn board_accelerometer_reads_through_i2c() {
    let tilted = AxisReading { x: 0.25, y: -0.5, z: 0.75 };
    let mut hw = board_hardware(FakeMma8451q::new(tilted)).expect("accelerometer present");
    let axes = hw.accelerometer.read_axes();
    assert!((axes.x - 0.25).abs() < 1e-3);
    assert!((axes.y + 0.5).abs() < 1e-3);
    assert!((axes.z - 0.75).abs() < 1e-3);
}

#[test]
fn missing_accelerometer_fails_bring_up() {
    assert!(board_hardware(EmptyBus).is_err());
}

#[test]
fn board_session_runs_on_simulated_peripherals() {
    hw_init::init_peripherals().unwrap();
    sim_set_temp_fraction(fraction_for(5.0));

    let mut hw = board_hardware(FakeMma8451q::new(LEVEL)).unwrap();
    assert!((hw.temperature.read_fraction() - fraction_for(5.0)).abs() < f32::EPSILON);

    let power = Arc::new(PowerSwitch::new());
    let presser = {
        let power = Arc::clone(&power);
        thread::spawn(move || {
            while !power.is_armed() {
                thread::sleep(Duration::from_millis(1));
            }
            thread::sleep(Duration::from_millis(100));
            power.on_rising_edge();
        })
    };

    let mut profile = JsonProfile::new(
        r#"{"min_temp":0,"max_temp":20,"max_tilt":10,"cooling_control_enabled":true}"#,
    );
    let report = MonitorSession::new(fast_config(), Arc::clone(&power), StdDelay::new())
        .run(hw, &mut profile)
        .unwrap();
    presser.join().unwrap();

    assert_eq!(report.fault, None);
    assert!(report.cycles.report > 0);
    // Coils released and LED dark once the session is over.
    for gpio in pins::COIL_GPIOS {
        assert!(hw_init::sim_gpio_level(gpio), "coil {gpio} left energised");
    }
    for ch in [hw_init::LEDC_CH_LED_R, hw_init::LEDC_CH_LED_G, hw_init::LEDC_CH_LED_B] {
        assert_eq!(hw_init::sim_ledc_duty(ch), 255);
    }
}
