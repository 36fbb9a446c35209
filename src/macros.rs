//! Logging macros for ergonomic log message formatting.
//!
//! Every macro comes in two forms:
//! - without a logger, the record goes to the current logging context
//! - with a leading [`Logger`](crate::Logger) expression, it goes to that logger
//!
//! The message is only formatted when the level is enabled. The call site
//! (file, line, module path and enclosing function) is recorded for the
//! `%F`, `%L`, `%C` and `%M` pattern conversions.
//!
//! # Examples
//!
//! ```
//! use rust_hierarchical_logger::{info, infof, LogContext};
//!
//! info!("Server started");
//!
//! let port = 8080;
//! let _ctx = LogContext::new("http").unwrap();
//! info!("Server listening on port {}", port);
//!
//! // printf style
//! infof!("Format %d %g %s", 3, 2.71828, "foo");
//! ```

/// Call site of the macro invocation, including the enclosing function.
#[doc(hidden)]
#[macro_export]
macro_rules! __location {
    () => {{
        fn __f() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __type_name_of(__f);
        $crate::core::Location::new(
            ::std::file!(),
            ::std::line!(),
            ::std::module_path!(),
            name.strip_suffix("::__f").unwrap_or(name),
        )
    }};
}

/// Log a message at a given level with automatic formatting.
///
/// # Examples
///
/// ```
/// use rust_hierarchical_logger::{log, LogLevel};
/// # use rust_hierarchical_logger::{get_logger};
///
/// log!(LogLevel::Info, "Simple message");
/// log!(LogLevel::Error, "Error code: {}", 500);
///
/// let logger = get_logger("app");
/// log!(logger, LogLevel::Warn, "Retry {} of {}", 1, 3);
/// ```
#[macro_export]
macro_rules! log {
    ($level:expr, $fmt:literal $(, $($arg:tt)*)?) => {{
        let __level = $level;
        if $crate::core::logger::is_enabled_for(__level) {
            $crate::core::logger::log_at(
                __level,
                ::std::format!($fmt $(, $($arg)*)?),
                ::std::option::Option::Some($crate::__location!()),
            );
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let __level = $level;
        let __logger = &$logger;
        if __logger.is_enabled_for(__level) {
            __logger.log_at(
                __level,
                ::std::format!($($arg)+),
                ::std::option::Option::Some($crate::__location!()),
            );
        }
    }};
}

/// Log a printf-style message at a given level.
///
/// Arguments are converted with `FieldValue::from`.
///
/// # Examples
///
/// ```
/// use rust_hierarchical_logger::{logf, LogLevel};
///
/// logf!(LogLevel::Info, "%-8s|%5.1f", "cpu", 93.25);
/// ```
#[macro_export]
macro_rules! logf {
    ($level:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let __level = $level;
        if $crate::core::logger::is_enabled_for(__level) {
            $crate::core::logger::logf_at(
                __level,
                $fmt,
                &[$($crate::FieldValue::from($arg)),*],
                ::std::option::Option::Some($crate::__location!()),
            );
        }
    }};
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let __level = $level;
        let __logger = &$logger;
        if __logger.is_enabled_for(__level) {
            __logger.logf_at(
                __level,
                $fmt,
                &[$($crate::FieldValue::from($arg)),*],
                ::std::option::Option::Some($crate::__location!()),
            );
        }
    }};
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// use rust_hierarchical_logger::trace;
/// trace!("Entering function: calculate()");
/// trace!("Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($fmt:literal $($rest:tt)*) => {
        $crate::log!($crate::LogLevel::Trace, $fmt $($rest)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// use rust_hierarchical_logger::{debug, get_logger};
/// debug!("Debug information");
///
/// let logger = get_logger("app.cache");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($fmt:literal $($rest:tt)*) => {
        $crate::log!($crate::LogLevel::Debug, $fmt $($rest)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($fmt:literal $($rest:tt)*) => {
        $crate::log!($crate::LogLevel::Info, $fmt $($rest)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($fmt:literal $($rest:tt)*) => {
        $crate::log!($crate::LogLevel::Warn, $fmt $($rest)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($fmt:literal $($rest:tt)*) => {
        $crate::log!($crate::LogLevel::Error, $fmt $($rest)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($fmt:literal $($rest:tt)*) => {
        $crate::log!($crate::LogLevel::Fatal, $fmt $($rest)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

/// printf-style trace message.
#[macro_export]
macro_rules! tracef {
    ($fmt:literal $($rest:tt)*) => {
        $crate::logf!($crate::LogLevel::Trace, $fmt $($rest)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// printf-style debug message.
#[macro_export]
macro_rules! debugf {
    ($fmt:literal $($rest:tt)*) => {
        $crate::logf!($crate::LogLevel::Debug, $fmt $($rest)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// printf-style info message.
///
/// # Examples
///
/// ```
/// use rust_hierarchical_logger::infof;
/// infof!("Format %d %g %s", 3, 2.71828, "foo");
/// ```
#[macro_export]
macro_rules! infof {
    ($fmt:literal $($rest:tt)*) => {
        $crate::logf!($crate::LogLevel::Info, $fmt $($rest)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// printf-style warning message.
#[macro_export]
macro_rules! warnf {
    ($fmt:literal $($rest:tt)*) => {
        $crate::logf!($crate::LogLevel::Warn, $fmt $($rest)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// printf-style error message.
#[macro_export]
macro_rules! errorf {
    ($fmt:literal $($rest:tt)*) => {
        $crate::logf!($crate::LogLevel::Error, $fmt $($rest)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// printf-style fatal message.
#[macro_export]
macro_rules! fatalf {
    ($fmt:literal $($rest:tt)*) => {
        $crate::logf!($crate::LogLevel::Fatal, $fmt $($rest)*)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Appender, Hierarchy, Layout, LogEntry, LogLevel, Result};
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Lines(Arc<Mutex<Vec<String>>>, Layout);

    impl Appender for Lines {
        fn append(&mut self, entry: &LogEntry) -> Result<()> {
            self.0.lock().push(self.1.format(entry));
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "lines"
        }
    }

    fn logger_with_lines(pattern: &str) -> (crate::Logger, Arc<Mutex<Vec<String>>>) {
        let hierarchy = Arc::new(Hierarchy::new());
        let lines = Arc::new(Mutex::new(Vec::new()));
        let layout = Layout::pattern(pattern).expect("valid pattern");
        hierarchy.add_appender("", Box::new(Lines(Arc::clone(&lines), layout)));
        (hierarchy.get_logger("macros"), lines)
    }

    #[test]
    fn test_logger_form_formats_and_filters() {
        let (logger, lines) = logger_with_lines("%p %m");
        debug!(logger, "hidden {}", 1);
        info!(logger, "Items: {}", 100);
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(&logger, "plain");
        log!(logger, LogLevel::Fatal, "Code: {}", 500);
        assert_eq!(
            *lines.lock(),
            vec!["INFO Items: 100", "WARN Retry 1 of 3", "ERROR plain", "FATAL Code: 500"]
        );
    }

    #[test]
    fn test_disabled_level_skips_formatting() {
        struct Loud;
        impl std::fmt::Display for Loud {
            fn fmt(&self, _: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                panic!("formatted a disabled record");
            }
        }
        let (logger, lines) = logger_with_lines("%m");
        trace!(logger, "{}", Loud);
        assert!(lines.lock().is_empty());
    }

    #[test]
    fn test_printf_macros() {
        let (logger, lines) = logger_with_lines("%m");
        infof!(logger, "Format %d %g %s", 3, 2.71828, "foo");
        errorf!(logger, "%05.1f%%", 9.87);
        logf!(logger, LogLevel::Warn, "no args");
        assert_eq!(*lines.lock(), vec!["Format 3 2.71828 foo", "009.9%", "no args"]);
    }

    #[test]
    fn test_location_captures_enclosing_function() {
        let (logger, lines) = logger_with_lines("%M %C %L");
        let line = line!() + 1;
        info!(logger, "here");
        assert_eq!(
            *lines.lock(),
            vec![format!(
                "test_location_captures_enclosing_function {} {}",
                module_path!(),
                line
            )]
        );
    }

    #[test]
    fn test_location_inside_closure_reports_function() {
        let (logger, lines) = logger_with_lines("%M");
        let run = || info!(logger, "from closure");
        run();
        assert_eq!(*lines.lock(), vec!["test_location_inside_closure_reports_function"]);
    }
}
