//! Conditional logging macros gated on a module-level `ENABLE_LOGS` flag.
//!
//! Modules with chatty diagnostics (reconstruction, mostly) define
//! `const ENABLE_LOGS: bool = true;` and use these macros instead of the
//! `log` ones directly, so per-record noise can be switched off at compile
//! time without touching call sites.

/// Info-level logging, active when the calling module's `ENABLE_LOGS` is true.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Warn-level logging, active when the calling module's `ENABLE_LOGS` is true.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Error-level logging, active when the calling module's `ENABLE_LOGS` is true.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
