//! Operator-facing status narrative.
//!
//! [`ReportingLoop`] only reads: the fault cell and the telemetry store.
//! Each cycle shows either the rotating OK narrative
//!
//! ```text
//! Status: OK      Status: OK      Status: OK      Status: OK
//! Temp: 21.50 C   TiltX: 1.25     TiltY: -0.50    TiltZ: 3.00
//! ```
//!
//! or, once a fault is latched, the same two fault frames forever.
//! Output goes to the [`Display`] and [`Indicator`] ports.

use core::fmt::{self, Write};
use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use heapless::String;
use log::info;

use crate::app::ports::{Display, Indicator, Rgb};
use crate::config::SystemConfig;
use crate::power::PowerSwitch;
use crate::safety::{Fault, FaultCell};
use crate::telemetry::{TelemetrySnapshot, TelemetryStore};

/// Characters per display line.
pub const LINE_WIDTH: usize = 16;

/// One screenful: two lines of at most [`LINE_WIDTH`] characters.
/// Longer text is cut at the line width.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub line1: String<LINE_WIDTH>,
    pub line2: String<LINE_WIDTH>,
}

/// `fmt::Write` sink that drops whatever does not fit.
struct Truncate<'a>(&'a mut String<LINE_WIDTH>);

impl Write for Truncate<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

fn line(args: fmt::Arguments<'_>) -> String<LINE_WIDTH> {
    let mut s = String::new();
    // Truncate never fails.
    let _ = Truncate(&mut s).write_fmt(args);
    s
}

impl Frame {
    pub fn new(line1: fmt::Arguments<'_>, line2: fmt::Arguments<'_>) -> Self {
        Self {
            line1: line(line1),
            line2: line(line2),
        }
    }

    pub fn text(line1: &str, line2: &str) -> Self {
        Self::new(format_args!("{line1}"), format_args!("{line2}"))
    }

    pub fn blank() -> Self {
        Self::default()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.line1, self.line2)
    }
}

/// A reading as printed on the display: two decimals, `--` if unsampled.
struct Reading(Option<f32>);

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.2}"),
            None => f.write_str("--"),
        }
    }
}

/// What one OK frame shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OkField {
    Temperature,
    TiltX,
    TiltY,
    TiltZ,
}

impl OkField {
    /// Display order of the OK narrative.
    pub const ORDER: [Self; 4] = [Self::Temperature, Self::TiltX, Self::TiltY, Self::TiltZ];
}

/// The OK frame for `field`, taken from `snap`.
pub fn ok_frame(field: OkField, snap: &TelemetrySnapshot) -> Frame {
    let tilt = snap.tilt;
    let (label, value, unit) = match field {
        OkField::Temperature => ("Temp", snap.temperature, " C"),
        OkField::TiltX => ("TiltX", tilt.map(|a| a.x), ""),
        OkField::TiltY => ("TiltY", tilt.map(|a| a.y), ""),
        OkField::TiltZ => ("TiltZ", tilt.map(|a| a.z), ""),
    };
    Frame::new(
        format_args!("Status: OK"),
        format_args!("{label}: {}{unit}", Reading(value)),
    )
}

/// The four OK frames for one snapshot.
pub fn ok_frames(snap: &TelemetrySnapshot) -> [Frame; 4] {
    OkField::ORDER.map(|field| ok_frame(field, snap))
}

/// The two fault frames: what was exceeded, then the recorded value.
pub fn fault_frames(fault: &Fault) -> [Frame; 2] {
    let label = fault.kind.label();
    let unit = if fault.kind.is_temperature() { " C" } else { "" };
    [
        Frame::new(format_args!("Status: FAULT"), format_args!("{label} exceeded")),
        Frame::new(
            format_args!("Status: FAULT"),
            format_args!("{label}: {}{unit}", Reading(Some(fault.offending_value))),
        ),
    ]
}

/// Periodic status narrative.  Runs on the session's own thread.
pub struct ReportingLoop<Dsp, Ind, D> {
    display: Dsp,
    indicator: Ind,
    store: Arc<TelemetryStore>,
    faults: Arc<FaultCell>,
    delay: D,
    dwell_ms: u32,
    flash_ms: u32,
    fault_dwell_ms: u32,
}

impl<Dsp: Display, Ind: Indicator, D: DelayNs> ReportingLoop<Dsp, Ind, D> {
    pub fn new(
        display: Dsp,
        indicator: Ind,
        store: Arc<TelemetryStore>,
        faults: Arc<FaultCell>,
        config: &SystemConfig,
        delay: D,
    ) -> Self {
        Self {
            display,
            indicator,
            store,
            faults,
            delay,
            dwell_ms: config.report_dwell_ms,
            flash_ms: config.report_flash_ms,
            fault_dwell_ms: config.fault_dwell_ms,
        }
    }

    fn flash(&mut self) {
        self.indicator.set(Rgb::STATUS_FLASH);
        self.delay.delay_ms(self.flash_ms);
        self.indicator.set(Rgb::OFF);
    }

    /// Show the current reading for `field`.  The store is read right
    /// before the frame goes out, never earlier in the cycle.
    fn show_current(&mut self, field: OkField) {
        let frame = ok_frame(field, &self.store.read_snapshot());
        self.display.show(&frame);
    }

    fn ok_cycle(&mut self) {
        self.show_current(OkField::Temperature);
        self.flash();
        self.delay.delay_ms(self.dwell_ms);
        for field in [OkField::TiltX, OkField::TiltY, OkField::TiltZ] {
            self.show_current(field);
            self.delay.delay_ms(self.dwell_ms);
        }
        self.flash();
    }

    fn fault_cycle(&mut self, fault: &Fault) {
        let [what, value] = fault_frames(fault);
        self.indicator.set(Rgb::FAULT);
        self.display.show(&what);
        self.delay.delay_ms(self.fault_dwell_ms);
        self.display.show(&value);
        self.indicator.set(Rgb::OFF);
        self.delay.delay_ms(self.fault_dwell_ms);
    }

    /// One full narrative.  Returns the fault shown, if any.
    pub fn run_cycle(&mut self) -> Option<Fault> {
        let fault = self.faults.get();
        match &fault {
            Some(f) => self.fault_cycle(f),
            None => self.ok_cycle(),
        }
        fault
    }

    /// Run until the session is powered off, then hand the collaborators
    /// back for the shutdown sequence.
    pub fn run(mut self, power: &PowerSwitch) -> (u64, Dsp, Ind) {
        info!("Reporting loop running");
        let mut cycles = 0;
        while power.is_powered() {
            self.run_cycle();
            cycles += 1;
        }
        info!("Reporting loop stopped after {} cycles", cycles);
        (cycles, self.display, self.indicator)
    }
}
