//! Monitoring session: startup, the four periodic tasks, shutdown.
//!
//! ```text
//!  Starting ─▶ spawn actuator/temp/tilt ─▶ readiness waits ─▶ self-test
//!      │                                        │ timeout
//!      │                                        ▼
//!      │                               SensorNotReady (tasks joined)
//!      ▼
//!  obtain profile ─▶ spawn classifier ─▶ arm button ─▶ ReportingLoop
//!                                                          │ powered = false
//!                                                          ▼
//!                                         shutdown lights ─▶ join all ─▶ SessionReport
//! ```
//!
//! Every task stops on its own when the powered flag clears; the join at
//! the end is the only place the session waits on another task.

use std::sync::Arc;
use std::thread::JoinHandle;

use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use crate::app::ports::{
    Accelerometer, CoilDriver, Display, Indicator, ProfileSource, Rgb, TemperatureInput,
};
use crate::app::report::{Frame, ReportingLoop};
use crate::config::{ProfileSlot, SystemConfig};
use crate::control::actuator::{OverrideFlag, SafetyActuator};
use crate::drivers::task_pin::{Core, Priority, TaskSpec, spawn_on_core};
use crate::error::{Error, Result, SensorKind, StartupError};
use crate::power::PowerSwitch;
use crate::safety::{Fault, FaultCell, FaultClassifier};
use crate::sensors::temperature::TemperatureSampler;
use crate::sensors::tilt::TiltSampler;
use crate::telemetry::TelemetryStore;

/// Readiness poll interval.
const READY_POLL_MS: u32 = 1;
/// Indicator step during the shutdown sequence.
const SHUTDOWN_STEP_MS: u32 = 200;
/// Blink length of the final "switch off" indication.
const BLINK_MS: u32 = 50;
const TASK_STACK_KB: usize = 16;

const ACTUATOR_TASK: TaskSpec = TaskSpec {
    name: "actuator\0",
    core: Core::App,
    priority: Priority::High,
    stack_kb: TASK_STACK_KB,
};
const TEMPERATURE_TASK: TaskSpec = TaskSpec {
    name: "temperature\0",
    core: Core::App,
    priority: Priority::High,
    stack_kb: TASK_STACK_KB,
};
const TILT_TASK: TaskSpec = TaskSpec {
    name: "tilt\0",
    core: Core::App,
    priority: Priority::High,
    stack_kb: TASK_STACK_KB,
};
const CLASSIFIER_TASK: TaskSpec = TaskSpec {
    name: "classifier\0",
    core: Core::App,
    priority: Priority::AboveNormal,
    stack_kb: TASK_STACK_KB,
};

/// The hardware collaborators one session consumes.
///
/// The first three move onto their tasks; display and indicator stay on
/// the session thread.
pub struct SessionHardware<T, A, C, Dsp, Ind> {
    pub temperature: T,
    pub accelerometer: A,
    pub coils: C,
    pub display: Dsp,
    pub indicator: Ind,
}

/// Cycles each task completed before it observed the powered flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCycles {
    pub temperature: u64,
    pub tilt: u64,
    pub actuator: u64,
    pub classifier: u64,
    pub report: u64,
}

/// Outcome of a session that reached monitoring and shut down cleanly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionReport {
    /// The fault latched during the session, if any.
    pub fault: Option<Fault>,
    pub cycles: TaskCycles,
}

/// Join handles of the running tasks.
#[derive(Default)]
struct Tasks {
    actuator: Option<JoinHandle<u64>>,
    temperature: Option<JoinHandle<u64>>,
    tilt: Option<JoinHandle<u64>>,
    classifier: Option<JoinHandle<u64>>,
}

impl Tasks {
    /// Wait for every started task.  All handles are joined even if one
    /// of them panicked; the first panic is reported.
    fn join(self) -> Result<TaskCycles> {
        let mut panicked = None;
        let mut join = |handle: Option<JoinHandle<u64>>, spec: TaskSpec| match handle {
            None => 0,
            Some(h) => h.join().unwrap_or_else(|_| {
                error!("Task '{}' panicked", spec.display_name());
                if panicked.is_none() {
                    panicked = Some(Error::TaskPanicked(spec.display_name()));
                }
                0
            }),
        };
        let cycles = TaskCycles {
            actuator: join(self.actuator, ACTUATOR_TASK),
            temperature: join(self.temperature, TEMPERATURE_TASK),
            tilt: join(self.tilt, TILT_TASK),
            classifier: join(self.classifier, CLASSIFIER_TASK),
            report: 0,
        };
        match panicked {
            Some(e) => Err(e),
            None => Ok(cycles),
        }
    }
}

/// One monitoring session, from power-on to the final join.
pub struct MonitorSession<D> {
    config: SystemConfig,
    power: Arc<PowerSwitch>,
    delay: D,
}

impl<D> MonitorSession<D>
where
    D: DelayNs + Clone + Send + 'static,
{
    /// `power` is shared with whatever delivers button edges (the GPIO
    /// ISR on target, a test thread on host).
    pub fn new(config: SystemConfig, power: Arc<PowerSwitch>, delay: D) -> Self {
        Self { config, power, delay }
    }

    /// Run the session to completion.
    ///
    /// Returns once the powered flag has cleared and every task has
    /// exited, or early with an error if startup fails (in which case the
    /// tasks already started are stopped and joined first).
    pub fn run<T, A, C, Dsp, Ind, P>(
        &mut self,
        hw: SessionHardware<T, A, C, Dsp, Ind>,
        profiles: &mut P,
    ) -> Result<SessionReport>
    where
        T: TemperatureInput + Send + 'static,
        A: Accelerometer + Send + 'static,
        C: CoilDriver + Send + 'static,
        Dsp: Display,
        Ind: Indicator,
        P: ProfileSource + ?Sized,
    {
        let SessionHardware {
            temperature,
            accelerometer,
            coils,
            mut display,
            mut indicator,
        } = hw;

        info!("CargaSEG session starting");
        indicator.set(Rgb::RED);
        display.show(&Frame::text("Starting...", ""));
        self.delay.delay_ms(50);

        // ── Sensor and actuator tasks ─────────────────────────
        indicator.set(Rgb::GREEN);
        let (store, temp_writer, tilt_writer) = TelemetryStore::new_shared();
        let (faults, latch) = FaultCell::new_shared();
        let profile_slot = Arc::new(ProfileSlot::new());
        let manual_override = Arc::new(OverrideFlag::new());
        let mut tasks = Tasks::default();

        let actuator = SafetyActuator::new(
            coils,
            Arc::clone(&store),
            Arc::clone(&profile_slot),
            Arc::clone(&manual_override),
            &self.config,
            self.delay.clone(),
        );
        display.show(&Frame::text("Starting", ACTUATOR_TASK.display_name()));
        tasks.actuator = Some(self.spawn(ACTUATOR_TASK, move |p| actuator.run(p))?);

        let sampler =
            TemperatureSampler::new(temperature, temp_writer, &self.config, self.delay.clone());
        display.show(&Frame::text("Starting", TEMPERATURE_TASK.display_name()));
        match self.spawn(TEMPERATURE_TASK, move |p| sampler.run(p)) {
            Ok(h) => tasks.temperature = Some(h),
            Err(e) => return Err(self.abort(tasks, e)),
        }

        let sampler =
            TiltSampler::new(accelerometer, tilt_writer, &self.config, self.delay.clone());
        display.show(&Frame::text("Starting", TILT_TASK.display_name()));
        match self.spawn(TILT_TASK, move |p| sampler.run(p)) {
            Ok(h) => tasks.tilt = Some(h),
            Err(e) => return Err(self.abort(tasks, e)),
        }

        // ── Readiness ─────────────────────────────────────────
        indicator.set(Rgb::BLUE);
        let max_temp = self.config.ready_max_temp;
        let max_tilt = self.config.ready_max_tilt;
        let ready = self
            .wait_until(SensorKind::Temperature, || {
                store.temperature().is_some_and(|t| t <= max_temp)
            })
            .and_then(|()| {
                self.wait_until(SensorKind::Accelerometer, || {
                    store.tilt().is_some_and(|a| a.max_axis() <= max_tilt)
                })
            });
        if let Err(sensor) = ready {
            display.show(&Frame::new(
                format_args!("Status: FAULT"),
                format_args!("{} timeout", sensor_label(sensor)),
            ));
            return Err(self.abort(tasks, StartupError::SensorNotReady(sensor).into()));
        }

        // ── Self-test ─────────────────────────────────────────
        info!("Actuator self-test ({} ms)", self.config.self_test_ms);
        manual_override.set();
        self.delay.delay_ms(self.config.self_test_ms);
        manual_override.clear();
        indicator.set(Rgb::OFF);

        // ── Configuration ─────────────────────────────────────
        let profile = match profiles.obtain(&store.read_snapshot()) {
            Ok(p) => p,
            Err(e) => {
                error!("No configuration profile: {}", e);
                return Err(self.abort(tasks, e.into()));
            }
        };
        if let Err(e) = profile.validate() {
            warn!("Profile accepted as given despite: {}", e);
        }
        info!(
            "Profile: temp {}..{}, tilt <= {}, cooling control {}",
            profile.min_temp,
            profile.max_temp,
            profile.max_tilt,
            if profile.cooling_control_enabled { "on" } else { "off" }
        );
        profile_slot.publish(profile);

        // ── Monitoring ────────────────────────────────────────
        let classifier = FaultClassifier::new(
            Arc::clone(&store),
            profile,
            latch,
            &self.config,
            self.delay.clone(),
        );
        match self.spawn(CLASSIFIER_TASK, move |p| classifier.run(p)) {
            Ok(h) => tasks.classifier = Some(h),
            Err(e) => return Err(self.abort(tasks, e)),
        }

        display.show(&Frame::blank());
        self.delay.delay_ms(self.config.button_arm_delay_ms);
        self.power.arm();

        let report = ReportingLoop::new(
            display,
            indicator,
            Arc::clone(&store),
            Arc::clone(&faults),
            &self.config,
            self.delay.clone(),
        );
        let (report_cycles, mut display, mut indicator) = report.run(&self.power);

        // ── Shutdown ──────────────────────────────────────────
        info!("Power button pressed, shutting down");
        display.show(&Frame::text("Shutting down", ""));
        for colour in [Rgb::RED, Rgb::GREEN, Rgb::BLUE] {
            indicator.set(colour);
            self.delay.delay_ms(SHUTDOWN_STEP_MS);
        }
        indicator.set(Rgb::OFF);

        let mut cycles = tasks.join()?;
        cycles.report = report_cycles;

        display.show(&Frame::text("Switch off", "the power."));
        for _ in 0..2 {
            indicator.set(Rgb::BLUE);
            self.delay.delay_ms(BLINK_MS);
            indicator.set(Rgb::OFF);
            self.delay.delay_ms(BLINK_MS);
        }

        let fault = faults.get();
        info!("Session ended (fault: {:?}, cycles: {:?})", fault, cycles);
        Ok(SessionReport { fault, cycles })
    }

    fn spawn(
        &self,
        spec: TaskSpec,
        task: impl FnOnce(&PowerSwitch) -> u64 + Send + 'static,
    ) -> Result<JoinHandle<u64>> {
        let power = Arc::clone(&self.power);
        Ok(spawn_on_core(spec, move || task(&power))?)
    }

    /// Poll `ready` until it holds or the readiness timeout expires.
    fn wait_until(
        &mut self,
        sensor: SensorKind,
        mut ready: impl FnMut() -> bool,
    ) -> core::result::Result<(), SensorKind> {
        let mut waited_ms: u32 = 0;
        while !ready() {
            if self.config.readiness_timeout_ms.is_some_and(|limit| waited_ms >= limit) {
                warn!("{} not ready after {} ms", sensor, waited_ms);
                return Err(sensor);
            }
            self.delay.delay_ms(READY_POLL_MS);
            waited_ms = waited_ms.saturating_add(READY_POLL_MS);
        }
        info!("{} ready after {} ms", sensor, waited_ms);
        Ok(())
    }

    /// Stop and join whatever was started, then hand back `err`.
    fn abort(&self, tasks: Tasks, err: Error) -> Error {
        error!("Startup aborted: {}", err);
        self.power.power_off();
        if let Err(join_err) = tasks.join() {
            warn!("While aborting: {}", join_err);
        }
        err
    }
}

fn sensor_label(kind: SensorKind) -> &'static str {
    match kind {
        SensorKind::Temperature => "Temp",
        SensorKind::Accelerometer => "Accel",
    }
}
