#![deny(missing_docs)]
//! Shared logging utilities for the runner workspace.
//!
//! This crate provides the `runner_*` logging macros used across the codebase,
//! a per-thread run counter that the macros stamp onto every line, and a
//! minimal test initializer for the global logger.

use std::cell::Cell;

thread_local! {
    /// Thread-local storage for the number of the script run in progress.
    static RUN_ID: Cell<u64> = const { Cell::new(0) };
}

/// Sets the run number for the current thread.
/// The engine calls this once before each execution.
pub fn set_run_id(run: u64) {
    RUN_ID.with(|v| v.set(run));
}

/// Retrieves the run number for the current thread.
/// Returns 0 if no run has started on this thread.
pub fn current_run_id() -> u64 {
    RUN_ID.with(|v| v.get())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! runner_trace {
    ($($arg:tt)*) => {{
        log::trace!("[run {}] {}", $crate::current_run_id(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! runner_info {
    ($($arg:tt)*) => {{
        log::info!("[run {}] {}", $crate::current_run_id(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! runner_debug {
    ($($arg:tt)*) => {{
        log::debug!("[run {}] {}", $crate::current_run_id(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! runner_warn {
    ($($arg:tt)*) => {{
        log::warn!("[run {}] {}", $crate::current_run_id(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! runner_error {
    ($($arg:tt)*) => {{
        log::error!("[run {}] {}", $crate::current_run_id(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
