//! Configuration profile sources.
//!
//! Implement [`ProfileSource`] without an interactive dialogue:
//!
//! | Source         | Profile comes from                         |
//! |----------------|--------------------------------------------|
//! | `FixedProfile` | a value built in code (factory defaults)   |
//! | `JsonProfile`  | a JSON document, e.g. baked in at build    |

use log::{info, warn};

use crate::app::ports::ProfileSource;
use crate::config::ConfigurationProfile;
use crate::error::ConfigError;
use crate::telemetry::TelemetrySnapshot;

/// Always hands out the same profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedProfile(pub ConfigurationProfile);

impl ProfileSource for FixedProfile {
    fn obtain(&mut self, _current: &TelemetrySnapshot) -> Result<ConfigurationProfile, ConfigError> {
        Ok(self.0)
    }
}

/// Parses a JSON profile and rejects it if it fails validation.
#[derive(Debug, Clone)]
pub struct JsonProfile {
    json: String,
}

impl JsonProfile {
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

impl ProfileSource for JsonProfile {
    fn obtain(&mut self, current: &TelemetrySnapshot) -> Result<ConfigurationProfile, ConfigError> {
        let profile = ConfigurationProfile::from_json(&self.json).inspect_err(|e| {
            warn!("JSON profile rejected: {}", e);
        })?;
        profile.validate()?;
        info!(
            "JSON profile loaded (current temp {:?})",
            current.temperature
        );
        Ok(profile)
    }
}
