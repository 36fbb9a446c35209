//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod layout;
pub mod log_context;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod mdc;
pub mod metrics;
pub mod printf;
pub mod timestamp;

pub use appender::Appender;
pub use config::{
    configure, configure_default, configure_file, configure_prop, configure_with, AppenderConfig,
    AppenderKind, Configuration, ConfigurationBuilder, LayoutConfig, LoggerConfig, CONFIG_ENV,
};
pub use error::{LoggerError, Result};
pub use hierarchy::{Hierarchy, SharedAppender};
pub use layout::{Layout, PatternLayout, DEFAULT_CONVERSION_PATTERN, DEFAULT_PATTERN};
pub use log_context::{default_logger_name, pop_context, push_context, push_context_with_level, LogContext};
pub use log_entry::{LogEntry, Location};
pub use log_level::LogLevel;
pub use logger::Logger;
pub use mdc::{FieldValue, MdcGuard};
pub use metrics::{LoggerMetrics, MetricsSnapshot};
pub use printf::sprintf;
pub use timestamp::TimestampFormat;
