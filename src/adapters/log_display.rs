//! Log-based display adapter.
//!
//! Implements [`Display`] by writing each two-line frame to the ESP-IDF
//! logger (UART / USB-CDC in production).  Stands in for a character LCD;
//! an LCD driver would implement the same trait.

use log::info;

use crate::app::ports::Display;
use crate::app::report::Frame;

/// Adapter that logs every frame to the serial console.
#[derive(Debug, Default)]
pub struct LogDisplay {
    last: Option<Frame>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame currently "on screen".
    pub fn current(&self) -> Option<&Frame> {
        self.last.as_ref()
    }
}

impl Display for LogDisplay {
    fn show(&mut self, frame: &Frame) {
        info!("LCD | {:<16} | {:<16}", frame.line1.as_str(), frame.line2.as_str());
        self.last = Some(frame.clone());
    }
}
