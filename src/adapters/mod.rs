//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter       | Implements     | Connects to                    |
//! |---------------|----------------|--------------------------------|
//! | `hardware`    | (bundle)       | ADC, MMA8451Q, coils, LED      |
//! | `log_display` | Display        | Serial log output              |
//! | `profile`     | ProfileSource  | Fixed / JSON profiles          |
//! | `time`        | DelayNs        | `std::thread::sleep` / FreeRTOS |

pub mod hardware;
pub mod log_display;
pub mod profile;
pub mod time;
