//! CargaSEG firmware: main entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                     │
//! │                                                               │
//! │  AdcTemperatureInput  Mma8451q   GpioCoils   StatusLed        │
//! │  LogDisplay           StdDelay   JsonProfile / FixedProfile   │
//! │                                                               │
//! │  ─────────────── Port Trait Boundary ───────────────────      │
//! │                                                               │
//! │  ┌─────────────────────────────────────────────────────┐      │
//! │  │  MonitorSession                                     │      │
//! │  │  samplers · actuator · classifier · reporting loop  │      │
//! │  └─────────────────────────────────────────────────────┘      │
//! │                                                               │
//! │  PowerSwitch ◀── button ISR                                   │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Result;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{error, info};

use cargoseg::adapters::hardware::board_hardware;
use cargoseg::adapters::profile::{FixedProfile, JsonProfile};
use cargoseg::adapters::time::StdDelay;
use cargoseg::app::ports::ProfileSource;
use cargoseg::app::session::MonitorSession;
use cargoseg::config::SystemConfig;
use cargoseg::drivers::{button, hw_init};
use cargoseg::pins;
use cargoseg::power::PowerSwitch;

/// Operator profile baked in at build time, if any.
const PROFILE_JSON: Option<&str> = option_env!("CARGASEG_PROFILE_JSON");

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CargaSEG v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;

    let peripherals = Peripherals::take()?;
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio14,
        peripherals.pins.gpio15,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;
    let hardware = board_hardware(i2c)?;

    // ── 3. Power button ───────────────────────────────────────
    let power = Arc::new(PowerSwitch::new());
    button::attach(Arc::clone(&power));
    hw_init::init_isr_service()?;

    // ── 4. Session ────────────────────────────────────────────
    let mut profiles: Box<dyn ProfileSource> = match PROFILE_JSON {
        Some(json) => Box::new(JsonProfile::new(json)),
        None => Box::new(FixedProfile::default()),
    };
    let mut session = MonitorSession::new(SystemConfig::default(), power, StdDelay::new());
    match session.run(hardware, profiles.as_mut()) {
        Ok(report) => info!("Session complete: {:?}", report),
        Err(e) => error!("Session failed: {}", e),
    }

    // Shutdown is signalled on the LED; wait for the power to be cut.
    loop {
        std::thread::sleep(std::time::Duration::from_secs(1));
    }
}
