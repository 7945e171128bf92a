//! Mock hardware for integration tests.
//!
//! Every mock shares its record through `Arc`s, so tests can keep
//! inspecting what a task did after the session has moved the mock onto
//! another thread.  Each input/output mock also counts calls made after
//! the powered flag cleared, which is what the shutdown-barrier checks
//! look at.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use cargoseg::adapters::time::StdDelay;
use cargoseg::app::ports::{
    Accelerometer, AxisReading, CoilDriver, Display, Indicator, ProfileSource, Rgb,
    TemperatureInput,
};
use cargoseg::app::report::Frame;
use cargoseg::app::session::SessionHardware;
use cargoseg::config::{ConfigurationProfile, SystemConfig};
use cargoseg::error::ConfigError;
use cargoseg::power::PowerSwitch;
use cargoseg::telemetry::TelemetrySnapshot;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};

// ── Time ──────────────────────────────────────────────────────

/// Real-time config with every dwell shortened so a whole session runs
/// in well under a second.  Stepping and self-test timings are kept.
pub fn fast_config() -> SystemConfig {
    SystemConfig {
        temp_window_samples: 10,
        tilt_period_ms: 10,
        classifier_period_ms: 10,
        report_dwell_ms: 20,
        report_flash_ms: 5,
        fault_dwell_ms: 20,
        readiness_timeout_ms: None,
        button_arm_delay_ms: 10,
        ..SystemConfig::default()
    }
}

/// Real delay that also counts, per task thread, the waits started after
/// the powered flag cleared.  Every periodic task waits once per cycle,
/// so this is how many cycles a task began (or finished) after power-off.
#[derive(Clone)]
pub struct TaskClock {
    inner: StdDelay,
    power: Arc<PowerSwitch>,
    after_off: Arc<Mutex<HashMap<String, u64>>>,
}

impl TaskClock {
    pub fn new(power: &Arc<PowerSwitch>) -> Self {
        Self {
            inner: StdDelay::new(),
            power: Arc::clone(power),
            after_off: Arc::default(),
        }
    }

    /// Waits started by task `name` after power-off.
    pub fn waits_after_off(&self, name: &str) -> u64 {
        self.after_off.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    fn record(&self) {
        if self.power.is_powered() {
            return;
        }
        let name = thread::current().name().unwrap_or("").to_owned();
        *self.after_off.lock().unwrap().entry(name).or_default() += 1;
    }
}

impl DelayNs for TaskClock {
    fn delay_ns(&mut self, ns: u32) {
        self.record();
        self.inner.delay_ns(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.record();
        self.inner.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.record();
        self.inner.delay_ms(ms);
    }
}

/// Raw ADC fraction that calibrates to `celsius` under the default config.
pub fn fraction_for(celsius: f32) -> f32 {
    celsius * 1024.0 / 350_000.0
}

// ── Call probe ────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Probe {
    calls: Arc<AtomicU64>,
    after_off: Arc<AtomicU64>,
    power: Arc<PowerSwitch>,
}

impl Probe {
    pub fn new(power: &Arc<PowerSwitch>) -> Self {
        Self {
            calls: Arc::new(AtomicU64::new(0)),
            after_off: Arc::new(AtomicU64::new(0)),
            power: Arc::clone(power),
        }
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.power.is_powered() {
            self.after_off.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn after_off(&self) -> u64 {
        self.after_off.load(Ordering::SeqCst)
    }
}

// ── Inputs ────────────────────────────────────────────────────

pub struct MockTemperature {
    pub fraction: f32,
    pub probe: Probe,
}

impl TemperatureInput for MockTemperature {
    fn read_fraction(&mut self) -> f32 {
        self.probe.hit();
        self.fraction
    }
}

pub struct MockAccelerometer {
    pub reading: AxisReading,
    pub probe: Probe,
}

impl Accelerometer for MockAccelerometer {
    fn read_axes(&mut self) -> AxisReading {
        self.probe.hit();
        self.reading
    }
}

// ── Outputs ───────────────────────────────────────────────────

pub struct RecordingCoils {
    pub log: Arc<Mutex<Vec<[PinState; 4]>>>,
    pub probe: Probe,
}

impl CoilDriver for RecordingCoils {
    fn drive(&mut self, levels: [PinState; 4]) {
        self.probe.hit();
        self.log.lock().unwrap().push(levels);
    }
}

pub struct RecordingDisplay {
    pub frames: Arc<Mutex<Vec<Frame>>>,
}

impl Display for RecordingDisplay {
    fn show(&mut self, frame: &Frame) {
        self.frames.lock().unwrap().push(frame.clone());
    }
}

pub struct RecordingIndicator {
    pub colours: Arc<Mutex<Vec<Rgb>>>,
}

impl Indicator for RecordingIndicator {
    fn set(&mut self, colour: Rgb) {
        self.colours.lock().unwrap().push(colour);
    }
}

// ── Profile sources ───────────────────────────────────────────

/// A configuration dialogue that gives up.
pub struct FailingProfile(pub ConfigError);

impl ProfileSource for FailingProfile {
    fn obtain(&mut self, _current: &TelemetrySnapshot) -> Result<ConfigurationProfile, ConfigError> {
        Err(self.0)
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type MockHardware = SessionHardware<
    MockTemperature,
    MockAccelerometer,
    RecordingCoils,
    RecordingDisplay,
    RecordingIndicator,
>;

/// Handles onto everything the mocks record.
pub struct Rig {
    pub power: Arc<PowerSwitch>,
    pub temp_probe: Probe,
    pub tilt_probe: Probe,
    pub coil_probe: Probe,
    pub coil_log: Arc<Mutex<Vec<[PinState; 4]>>>,
    pub frames: Arc<Mutex<Vec<Frame>>>,
    pub colours: Arc<Mutex<Vec<Rgb>>>,
}

impl Rig {
    /// Hardware reading a constant temperature and constant raw axes.
    pub fn new(celsius: f32, axes: AxisReading) -> (Self, MockHardware) {
        let power = Arc::new(PowerSwitch::new());
        let rig = Self {
            temp_probe: Probe::new(&power),
            tilt_probe: Probe::new(&power),
            coil_probe: Probe::new(&power),
            coil_log: Arc::default(),
            frames: Arc::default(),
            colours: Arc::default(),
            power,
        };
        let hw = SessionHardware {
            temperature: MockTemperature {
                fraction: fraction_for(celsius),
                probe: rig.temp_probe.clone(),
            },
            accelerometer: MockAccelerometer {
                reading: axes,
                probe: rig.tilt_probe.clone(),
            },
            coils: RecordingCoils {
                log: Arc::clone(&rig.coil_log),
                probe: rig.coil_probe.clone(),
            },
            display: RecordingDisplay {
                frames: Arc::clone(&rig.frames),
            },
            indicator: RecordingIndicator {
                colours: Arc::clone(&rig.colours),
            },
        };
        (rig, hw)
    }

    /// Whether any frame so far had `text` on its second line.
    pub fn showed(&self, text: &str) -> bool {
        self.frames.lock().unwrap().iter().any(|f| f.line2.as_str() == text)
    }

    /// How many frames so far had `text` on their second line.
    pub fn times_shown(&self, text: &str) -> usize {
        self.frames.lock().unwrap().iter().filter(|f| f.line2.as_str() == text).count()
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.frames.lock().unwrap().last().cloned()
    }

    /// Press the power button once the session has armed it and `ready`
    /// holds (or after a 5 s safety deadline).
    pub fn press_when(
        &self,
        ready: impl Fn(&Rig) -> bool + Send + 'static,
    ) -> JoinHandle<()> {
        let watcher = self.watcher();
        thread::spawn(move || {
            let deadline = Instant::now() + Duration::from_secs(5);
            while !(watcher.power.is_armed() && ready(&watcher)) && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(1));
            }
            thread::sleep(Duration::from_millis(5));
            watcher.power.on_rising_edge();
        })
    }

    fn watcher(&self) -> Rig {
        Rig {
            power: Arc::clone(&self.power),
            temp_probe: self.temp_probe.clone(),
            tilt_probe: self.tilt_probe.clone(),
            coil_probe: self.coil_probe.clone(),
            coil_log: Arc::clone(&self.coil_log),
            frames: Arc::clone(&self.frames),
            colours: Arc::clone(&self.colours),
        }
    }
}

/// Accelerometer resting flat: zero tilt on every axis.
pub const LEVEL: AxisReading = AxisReading { x: 0.0, y: 0.0, z: 1.0 };

// ── I²C register file (MMA8451Q) ──────────────────────────────

/// In-memory MMA8451Q: WHO_AM_I answers 0x1A and the output registers
/// hold a fixed reading.
pub struct FakeMma8451q {
    regs: [u8; 0x40],
    ptr: usize,
}

impl FakeMma8451q {
    /// `axes` in g.
    pub fn new(axes: AxisReading) -> Self {
        let mut regs = [0u8; 0x40];
        regs[0x0D] = 0x1A;
        for (i, g) in [axes.x, axes.y, axes.z].into_iter().enumerate() {
            let counts = ((g * 4096.0) as i16) << 2;
            let [msb, lsb] = counts.to_be_bytes();
            regs[1 + 2 * i] = msb;
            regs[2 + 2 * i] = lsb;
        }
        Self { regs, ptr: 0 }
    }
}

impl ErrorType for FakeMma8451q {
    type Error = ErrorKind;
}

impl I2c for FakeMma8451q {
    fn transaction(&mut self, _address: u8, ops: &mut [Operation<'_>]) -> Result<(), ErrorKind> {
        for op in ops {
            match op {
                Operation::Write(bytes) => {
                    self.ptr = usize::from(bytes[0]);
                    for b in &bytes[1..] {
                        self.regs[self.ptr] = *b;
                        self.ptr += 1;
                    }
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.regs[self.ptr];
                        self.ptr += 1;
                    }
                }
            }
        }
        Ok(())
    }
}
