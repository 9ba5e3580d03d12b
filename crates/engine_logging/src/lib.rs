#![deny(missing_docs)]
//! Logging facade shared by the café harvester crates.
//!
//! Library code logs through the `engine_*` macros so the backing facade can be
//! swapped in one place. Binaries install the real logger; tests call
//! [`initialize_for_tests`].

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Level used by binaries and tests: debug in debug builds, info in release builds.
pub fn default_level() -> log::LevelFilter {
    if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

/// Initializes a terminal logger for tests.
///
/// Safe to call repeatedly; later calls are no-ops once a logger is installed.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

    let _ = TermLogger::init(
        default_level(),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
}

#[cfg(test)]
mod tests {
    #[test]
    fn macros_log_without_installed_logger() {
        engine_trace!("trace {}", 1);
        engine_debug!("debug {}", 2);
        engine_info!("info {}", 3);
        engine_warn!("warn {}", 4);
        engine_error!("error {}", 5);
    }

    #[test]
    fn repeated_initialization_is_harmless() {
        super::initialize_for_tests();
        super::initialize_for_tests();
        log::info!("logger ready");
    }
}
