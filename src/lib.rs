//! # Rust Hierarchical Logger
//!
//! A hierarchical, context-aware logging core in the log4j tradition.
//!
//! ## Features
//!
//! - **Logger Hierarchy**: dotted logger names inherit levels and appenders
//!   from their ancestors
//! - **Logging Contexts**: nested, thread-local scopes that name the default
//!   logger and may override its level
//! - **MDC**: thread-local key-value pairs rendered by `%X`
//! - **Pattern Layouts**: log4j conversion patterns, console and file appenders
//! - **Configuration**: log4j-style properties, programmatic builder, serde
//! - **`log` Bridge**: route records of the `log` facade into the hierarchy
//!
//! ## Example
//!
//! ```
//! use rust_hierarchical_logger::{debug, info, mdc, LogContext, LogLevel};
//!
//! info!("starting");
//! {
//!     let _ctx = LogContext::new("component").unwrap();
//!     let _sub = LogContext::with_level("subcomp", LogLevel::Trace).unwrap();
//!     mdc::put("request", 42);
//!     debug!("inside component.subcomp");
//! }
//! mdc::clear();
//! ```

pub mod appenders;
pub mod bridge;
pub mod core;
pub mod macros;

pub use crate::core::mdc;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, ConsoleTarget, FileAppender};
    pub use crate::bridge::LogBridge;
    pub use crate::core::{
        Appender, AppenderConfig, Configuration, FieldValue, Hierarchy, Layout, LayoutConfig,
        LogContext, LogEntry, LogLevel, Logger, LoggerError, LoggerMetrics, PatternLayout, Result,
    };
    pub use crate::{
        debug, debugf, error, errorf, fatal, fatalf, info, infof, log, logf, trace, tracef, warn,
        warnf,
    };
}

pub use appenders::{ConsoleAppender, ConsoleTarget, FileAppender};
pub use bridge::LogBridge;
pub use crate::core::logger::{
    debug, default_logger, error, fatal, flush, get_level, get_logger, info, is_enabled_for, log,
    log_at, logf, set_level, trace, warn,
};
pub use crate::core::{
    configure, configure_default, configure_file, configure_prop, configure_with,
    default_logger_name, pop_context, push_context, push_context_with_level, sprintf, Appender,
    AppenderConfig, AppenderKind, Configuration, ConfigurationBuilder, FieldValue, Hierarchy,
    Layout, LayoutConfig, Location, LogContext, LogEntry, LogLevel, Logger, LoggerConfig,
    LoggerError, LoggerMetrics, MdcGuard, MetricsSnapshot, PatternLayout, Result, SharedAppender,
    TimestampFormat, CONFIG_ENV, DEFAULT_CONVERSION_PATTERN,
};
