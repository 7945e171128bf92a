//! Fuzz target: `ConfigurationProfile::from_json`
//!
//! Feeds arbitrary bytes to the profile parser and checks:
//! - No panics under any input
//! - A parsed profile survives a JSON round trip unchanged
//! - `validate()` accepts exactly the profiles with `min_temp < max_temp`
//!   and a non-negative tilt limit
//!
//! cargo fuzz run fuzz_profile_json

#![no_main]

use cargoseg::config::ConfigurationProfile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(profile) = ConfigurationProfile::from_json(text) else {
        return;
    };

    let json = serde_json::to_string(&profile).unwrap();
    assert_eq!(ConfigurationProfile::from_json(&json).unwrap(), profile);

    let sane = profile.min_temp < profile.max_temp && profile.max_tilt >= 0;
    assert_eq!(profile.validate().is_ok(), sane);
});
