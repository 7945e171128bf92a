//! Core-pinned task spawning.
//!
//! Wraps `esp_pthread_set_cfg()` so that `std::thread::Builder::spawn`
//! creates a FreeRTOS task on a chosen core with an explicit priority and
//! stack.  On the host the core and priority are ignored and a plain
//! thread is created.
//!
//! `esp_pthread_set_cfg()` is thread-local and applies to the *next*
//! `pthread_create()` from the calling thread, so the session spawns its
//! tasks one after another from a single thread.

use std::thread::JoinHandle;

use crate::error::StartupError;

/// CPU core a task is pinned to.  The monitoring tasks all run on the
/// ESP32-S3's APP_CPU; core 0 is left to the IDF's own tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 1 (APP_CPU).
    App = 1,
}

/// Task priority levels used by the session.
///
/// Samplers and the actuator run above the classifier, which runs above
/// the reporting loop (the session's own thread).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    AboveNormal,
    High,
}

impl Priority {
    /// FreeRTOS priority number.
    pub const fn freertos(self) -> u8 {
        match self {
            Self::AboveNormal => 6,
            Self::High => 8,
        }
    }
}

/// Parameters for one task.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    /// Null-terminated on ESP-IDF (e.g. `"tilt\0"`).
    pub name: &'static str,
    pub core: Core,
    pub priority: Priority,
    pub stack_kb: usize,
}

impl TaskSpec {
    pub fn display_name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }
}

#[cfg(target_os = "espidf")]
pub fn spawn_on_core<T: Send + 'static>(
    spec: TaskSpec,
    f: impl FnOnce() -> T + Send + 'static,
) -> Result<JoinHandle<T>, StartupError> {
    // SAFETY: plain struct writes followed by a thread-local config call;
    // the session spawns from one thread only.
    unsafe {
        let mut cfg = esp_idf_sys::esp_pthread_get_default_config();
        cfg.pin_to_core = spec.core as i32;
        cfg.prio = i32::from(spec.priority.freertos());
        cfg.stack_size = (spec.stack_kb * 1024) as _;
        cfg.thread_name = spec.name.as_ptr() as *const _;
        let ret = esp_idf_sys::esp_pthread_set_cfg(&cfg);
        if ret != esp_idf_sys::ESP_OK as i32 {
            log::error!("esp_pthread_set_cfg failed for '{}': {}", spec.display_name(), ret);
            return Err(StartupError::Spawn(spec.display_name()));
        }
    }

    log::info!(
        "Spawning '{}' on {:?} (pri={:?}, stack={}KB)",
        spec.display_name(),
        spec.core,
        spec.priority,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(spec.display_name().into())
        .spawn(f)
        .map_err(|_| StartupError::Spawn(spec.display_name()))
}

/// Host fallback: core affinity and priority are ignored.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_on_core<T: Send + 'static>(
    spec: TaskSpec,
    f: impl FnOnce() -> T + Send + 'static,
) -> Result<JoinHandle<T>, StartupError> {
    log::info!(
        "Spawning '{}' (sim, no core pinning, stack={}KB)",
        spec.display_name(),
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(spec.display_name().into())
        .stack_size(spec.stack_kb * 1024)
        .spawn(f)
        .map_err(|_| StartupError::Spawn(spec.display_name()))
}
