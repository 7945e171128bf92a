//! End-to-end session tests: startup, monitoring, shutdown barrier.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cargoseg::adapters::profile::FixedProfile;
use cargoseg::adapters::time::StdDelay;
use cargoseg::app::ports::{AxisReading, Rgb};
use cargoseg::app::session::MonitorSession;
use cargoseg::config::{ConfigurationProfile, SystemConfig};
use cargoseg::control::actuator::{COMMUTATION, IDLE};
use cargoseg::error::{ConfigError, Error, SensorKind, StartupError};
use cargoseg::safety::FaultKind;

use crate::mock_hw::{FailingProfile, LEVEL, Rig, TaskClock, fast_config};

fn session(rig: &Rig, config: SystemConfig) -> MonitorSession<StdDelay> {
    MonitorSession::new(config, Arc::clone(&rig.power), StdDelay::new())
}

#[test]
fn healthy_session_runs_until_button_press() {
    let (rig, hw) = Rig::new(5.0, LEVEL);
    let presser = rig.press_when(|r| r.showed("TiltZ: 0.00"));

    let report = session(&rig, fast_config())
        .run(hw, &mut FixedProfile::default())
        .expect("session");
    presser.join().unwrap();

    assert_eq!(report.fault, None);
    assert!(report.cycles.temperature > 0);
    assert!(report.cycles.tilt > 0);
    assert!(report.cycles.actuator > 0);
    assert!(report.cycles.classifier > 0);
    assert!(report.cycles.report > 0);

    assert!(rig.showed("Temp: 5.00 C"));
    let last = rig.last_frame().unwrap();
    assert_eq!((last.line1.as_str(), last.line2.as_str()), ("Switch off", "the power."));
    assert_eq!(rig.colours.lock().unwrap().last(), Some(&Rgb::OFF));
}

#[test]
fn startup_shows_indicator_sequence_and_task_names() {
    let (rig, hw) = Rig::new(5.0, LEVEL);
    let presser = rig.press_when(|_| true);
    session(&rig, fast_config())
        .run(hw, &mut FixedProfile::default())
        .unwrap();
    presser.join().unwrap();

    let colours = rig.colours.lock().unwrap().clone();
    assert_eq!(&colours[..4], &[Rgb::RED, Rgb::GREEN, Rgb::BLUE, Rgb::OFF]);

    let frames = rig.frames.lock().unwrap().clone();
    assert_eq!(frames[0].line1.as_str(), "Starting...");
    let names: Vec<&str> = frames[1..4].iter().map(|f| f.line2.as_str()).collect();
    assert_eq!(names, ["actuator", "temperature", "tilt"]);
}

#[test]
fn self_test_steps_the_actuator_before_configuration() {
    let (rig, hw) = Rig::new(5.0, LEVEL);
    let presser = rig.press_when(|_| true);
    session(&rig, fast_config())
        .run(hw, &mut FixedProfile::default())
        .unwrap();
    presser.join().unwrap();

    let log = rig.coil_log.lock().unwrap().clone();
    assert!(log.contains(&COMMUTATION[0]));
    assert!(log.contains(&COMMUTATION[1]));
    // Cooling control is off and 5 °C is cold: the override is the only
    // thing that ever moved the motor, and it is released at the end.
    assert_eq!(log.last(), Some(&IDLE));
}

#[test]
fn high_temperature_fault_is_latched_and_reported() {
    let (rig, hw) = Rig::new(25.0, LEVEL);
    let presser = rig.press_when(|r| r.showed("Tmax: 25.00 C"));

    let report = session(&rig, fast_config())
        .run(hw, &mut FixedProfile::default())
        .unwrap();
    presser.join().unwrap();

    let fault = report.fault.expect("fault latched");
    assert_eq!(fault.kind, FaultKind::HighTemp);
    assert!((fault.offending_value - 25.0).abs() < 0.01);
    assert!(rig.showed("Tmax exceeded"));
    assert!(rig.colours.lock().unwrap().contains(&Rgb::FAULT));
}

#[test]
fn tilt_fault_names_the_axis() {
    // 0.2 g on Y is 18 degrees, over the default 10 degree limit.
    let axes = AxisReading { x: 0.0, y: 0.2, z: 1.0 };
    let (rig, hw) = Rig::new(5.0, axes);
    let presser = rig.press_when(|r| r.showed("TiltY exceeded"));

    let report = session(&rig, fast_config())
        .run(hw, &mut FixedProfile::default())
        .unwrap();
    presser.join().unwrap();

    assert_eq!(report.fault.map(|f| f.kind), Some(FaultKind::TiltY));
}

#[test]
fn cooling_control_keeps_the_motor_running_near_max_temp() {
    let (rig, hw) = Rig::new(18.0, LEVEL);
    let profile = ConfigurationProfile {
        cooling_control_enabled: true,
        ..ConfigurationProfile::default()
    };
    let config = SystemConfig {
        self_test_ms: 30,
        ..fast_config()
    };
    let self_test_steps = (config.self_test_ms / config.step_hold_ms) as usize;
    let presser = rig.press_when(|r| r.times_shown("TiltZ: 0.00") >= 3);

    let report = session(&rig, config)
        .run(hw, &mut FixedProfile(profile))
        .unwrap();
    presser.join().unwrap();

    assert_eq!(report.fault, None);
    let log = rig.coil_log.lock().unwrap().clone();
    let steps = log.iter().filter(|l| **l != IDLE).count();
    assert!(steps > 3 * self_test_steps, "only {steps} steps");
}

#[test]
fn shutdown_barrier_stops_every_task_within_one_cycle() {
    let config = fast_config();
    let window = u64::from(config.temp_window_samples);
    let (rig, hw) = Rig::new(5.0, LEVEL);
    let clock = TaskClock::new(&rig.power);
    let presser = rig.press_when(|r| r.showed("TiltX: 0.00"));

    MonitorSession::new(config, Arc::clone(&rig.power), clock.clone())
        .run(hw, &mut FixedProfile::default())
        .unwrap();
    presser.join().unwrap();

    // Anything still in flight when the flag cleared finished its own
    // cycle and nothing more.
    assert!(rig.tilt_probe.after_off() <= 1);
    assert!(rig.temp_probe.after_off() <= window);
    // One step in flight plus the final release.
    assert!(rig.coil_probe.after_off() <= 2);
    // One wait per cycle: the cycle in flight, never a fresh one.
    assert!(clock.waits_after_off("classifier") <= 1);
    assert!(clock.waits_after_off("tilt") <= 1);
    assert!(clock.waits_after_off("actuator") <= 1);

    // The join returned only after every task exited: nothing moves now.
    let before = (rig.temp_probe.calls(), rig.tilt_probe.calls(), rig.coil_probe.calls());
    thread::sleep(Duration::from_millis(20));
    let after = (rig.temp_probe.calls(), rig.tilt_probe.calls(), rig.coil_probe.calls());
    assert_eq!(before, after);
}

#[test]
fn button_edges_before_monitoring_are_ignored() {
    let (rig, hw) = Rig::new(5.0, LEVEL);
    assert!(!rig.power.on_rising_edge());
    let presser = rig.press_when(|_| true);
    let report = session(&rig, fast_config())
        .run(hw, &mut FixedProfile::default())
        .unwrap();
    presser.join().unwrap();
    assert!(report.cycles.report > 0);
}

#[test]
fn accelerometer_never_ready_times_out() {
    // 3 g on X reads as 270 degrees: never plausible.
    let axes = AxisReading { x: 3.0, y: 0.0, z: 1.0 };
    let (rig, hw) = Rig::new(5.0, axes);
    let config = SystemConfig {
        readiness_timeout_ms: Some(50),
        ..fast_config()
    };

    let err = session(&rig, config)
        .run(hw, &mut FixedProfile::default())
        .unwrap_err();

    assert_eq!(
        err,
        Error::Startup(StartupError::SensorNotReady(SensorKind::Accelerometer))
    );
    assert!(!rig.power.is_powered());
    assert!(rig.showed("Accel timeout"));

    let before = rig.tilt_probe.calls();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(rig.tilt_probe.calls(), before, "tasks must be joined");
}

#[test]
fn implausible_temperature_times_out() {
    let (rig, hw) = Rig::new(95.0, LEVEL);
    let config = SystemConfig {
        readiness_timeout_ms: Some(50),
        ..fast_config()
    };
    let err = session(&rig, config)
        .run(hw, &mut FixedProfile::default())
        .unwrap_err();
    assert_eq!(
        err,
        Error::Startup(StartupError::SensorNotReady(SensorKind::Temperature))
    );
    assert!(rig.showed("Temp timeout"));
}

#[test]
fn abandoned_configuration_stops_the_session() {
    let (rig, hw) = Rig::new(5.0, LEVEL);
    let err = session(&rig, fast_config())
        .run(hw, &mut FailingProfile(ConfigError::Cancelled))
        .unwrap_err();
    assert_eq!(err, Error::Config(ConfigError::Cancelled));
    assert!(!rig.power.is_powered());
    assert!(!rig.power.is_armed());
}
