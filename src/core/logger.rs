//! Record emission
//!
//! Two ways to emit records:
//! - the free functions (`info`, `log`, `logf`, ...), which log through the
//!   default logger of the calling thread, i.e. the innermost `LogContext`
//! - a [`Logger`] handle bound to one name of a [`Hierarchy`]
//!
//! Both check the threshold before a record is built, stamp it with the
//! caller's MDC and hand it to the registry for dispatch.

use super::error::Result;
use super::hierarchy::{parent_name, Hierarchy};
use super::log_context::{self, compose_name};
use super::log_entry::{LogEntry, Location};
use super::log_level::LogLevel;
use super::mdc::{self, FieldValue};
use super::printf::sprintf;
use super::Appender;
use std::fmt;
use std::sync::Arc;

/// Build a record for `name` and dispatch it.
pub(crate) fn emit(
    hierarchy: &Hierarchy,
    name: &str,
    level: LogLevel,
    message: &str,
    location: Option<Location>,
) {
    let mut entry = LogEntry::new(level, name, message).with_mdc(mdc::snapshot());
    entry.location = location;
    hierarchy.dispatch(&entry);
}

/// Handle for a named logger
///
/// Cheap to clone. Thresholds are resolved through the registry on every
/// call, so level changes and reconfigurations apply immediately.
///
/// # Example
///
/// ```
/// use rust_hierarchical_logger::{Hierarchy, LogLevel};
/// use std::sync::Arc;
///
/// let hierarchy = Arc::new(Hierarchy::new());
/// let logger = hierarchy.get_logger("app.db");
/// logger.set_level(LogLevel::Debug);
/// assert!(logger.is_enabled_for(LogLevel::Debug));
/// assert_eq!(logger.parent().map(|p| p.name().to_string()), Some("app".to_string()));
/// ```
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    hierarchy: Arc<Hierarchy>,
}

impl Logger {
    pub(crate) fn new(name: &str, hierarchy: Arc<Hierarchy>) -> Self {
        Self {
            name: Arc::from(name),
            hierarchy,
        }
    }

    /// Dotted name, `""` for the root logger.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hierarchy(&self) -> &Arc<Hierarchy> {
        &self.hierarchy
    }

    /// Explicit level of this logger, if set.
    pub fn level(&self) -> Option<LogLevel> {
        self.hierarchy.level(&self.name)
    }

    pub fn set_level(&self, level: LogLevel) {
        self.hierarchy.set_level(&self.name, level);
    }

    pub fn clear_level(&self) {
        self.hierarchy.clear_level(&self.name);
    }

    pub fn effective_level(&self) -> LogLevel {
        self.hierarchy.effective_level(&self.name)
    }

    #[inline]
    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        self.hierarchy.is_enabled_for(&self.name, level)
    }

    pub fn add_appender(&self, appender: Box<dyn Appender>) {
        self.hierarchy.add_appender(&self.name, appender);
    }

    pub fn clear_appenders(&self) {
        self.hierarchy.clear_appenders(&self.name);
    }

    /// Parent logger, `None` for the root.
    pub fn parent(&self) -> Option<Logger> {
        parent_name(&self.name).map(|parent| self.hierarchy.get_logger(parent))
    }

    /// Child logger `<name>.<component>`.
    pub fn child(&self, component: &str) -> Logger {
        self.hierarchy.get_logger(&compose_name(&self.name, component))
    }

    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        self.log_at(level, message, None);
    }

    /// Log with an explicit call site, as the macros do.
    pub fn log_at(&self, level: LogLevel, message: impl AsRef<str>, location: Option<Location>) {
        if !self.is_enabled_for(level) {
            return;
        }
        emit(&self.hierarchy, &self.name, level, message.as_ref(), location);
    }

    /// Build the message only if `level` is enabled.
    pub fn log_with<F, S>(&self, level: LogLevel, message: F)
    where
        F: FnOnce() -> S,
        S: AsRef<str>,
    {
        if self.is_enabled_for(level) {
            emit(&self.hierarchy, &self.name, level, message().as_ref(), None);
        }
    }

    /// printf-style logging: `logger.logf(LogLevel::Info, "%d items", &[3.into()])`.
    pub fn logf(&self, level: LogLevel, format: &str, args: &[FieldValue]) {
        self.logf_at(level, format, args, None);
    }

    pub fn logf_at(
        &self,
        level: LogLevel,
        format: &str,
        args: &[FieldValue],
        location: Option<Location>,
    ) {
        if self.is_enabled_for(level) {
            emit(&self.hierarchy, &self.name, level, &sprintf(format, args), location);
        }
    }

    #[inline]
    pub fn trace(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Fatal, message);
    }

    pub fn flush(&self) -> Result<()> {
        self.hierarchy.flush()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("effective_level", &self.effective_level())
            .finish()
    }
}

/// Handle for `name` in the global registry.
pub fn get_logger(name: &str) -> Logger {
    Hierarchy::global().get_logger(name)
}

/// Handle for the calling thread's current context.
pub fn default_logger() -> Logger {
    get_logger(&log_context::default_logger_name())
}

/// Set the level of `name` in the global registry.
pub fn set_level(name: &str, level: LogLevel) {
    Hierarchy::global().set_level(name, level);
}

/// Explicit level of `name` in the global registry.
pub fn get_level(name: &str) -> Option<LogLevel> {
    Hierarchy::global().level(name)
}

/// Whether a record at `level` would be emitted in the current context.
#[inline]
pub fn is_enabled_for(level: LogLevel) -> bool {
    level.passes(log_context::effective_level_in(Hierarchy::global()))
}

pub fn log(level: LogLevel, message: impl AsRef<str>) {
    log_at(level, message, None);
}

/// Log through the current context with an explicit call site.
pub fn log_at(level: LogLevel, message: impl AsRef<str>, location: Option<Location>) {
    let hierarchy = Hierarchy::global();
    if let Some(name) = log_context::enabled_name_in(hierarchy, level) {
        emit(hierarchy, &name, level, message.as_ref(), location);
    }
}

pub fn logf(level: LogLevel, format: &str, args: &[FieldValue]) {
    logf_at(level, format, args, None);
}

pub fn logf_at(level: LogLevel, format: &str, args: &[FieldValue], location: Option<Location>) {
    let hierarchy = Hierarchy::global();
    if let Some(name) = log_context::enabled_name_in(hierarchy, level) {
        emit(hierarchy, &name, level, &sprintf(format, args), location);
    }
}

#[inline]
pub fn trace(message: impl AsRef<str>) {
    log(LogLevel::Trace, message);
}

#[inline]
pub fn debug(message: impl AsRef<str>) {
    log(LogLevel::Debug, message);
}

#[inline]
pub fn info(message: impl AsRef<str>) {
    log(LogLevel::Info, message);
}

#[inline]
pub fn warn(message: impl AsRef<str>) {
    log(LogLevel::Warn, message);
}

#[inline]
pub fn error(message: impl AsRef<str>) {
    log(LogLevel::Error, message);
}

#[inline]
pub fn fatal(message: impl AsRef<str>) {
    log(LogLevel::Fatal, message);
}

/// Flush every appender of the global registry.
pub fn flush() -> Result<()> {
    Hierarchy::global().flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Layout, LogContext};
    use parking_lot::Mutex;

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

    fn setup(pattern: &str) -> (Arc<Hierarchy>, Arc<Mutex<Vec<String>>>) {
        let hierarchy = Arc::new(Hierarchy::new());
        let lines = Arc::new(Mutex::new(Vec::new()));
        let layout = Layout::pattern(pattern).expect("valid pattern");
        hierarchy.add_appender("", Box::new(Lines(Arc::clone(&lines), layout)));
        (hierarchy, lines)
    }

    #[test]
    fn test_logger_respects_threshold() {
        let (h, lines) = setup("%p %c %m");
        let logger = h.get_logger("app");
        logger.debug("hidden");
        logger.info("shown");
        logger.set_level(LogLevel::Trace);
        logger.trace("now shown");
        assert_eq!(*lines.lock(), vec!["INFO app shown", "TRACE app now shown"]);
    }

    #[test]
    fn test_log_with_is_lazy() {
        let (h, lines) = setup("%m");
        let logger = h.get_logger("lazy");
        let mut called = false;
        logger.log_with(LogLevel::Debug, || {
            called = true;
            "never"
        });
        assert!(!called);
        logger.log_with(LogLevel::Error, || format!("{} + {}", 1, 2));
        assert_eq!(*lines.lock(), vec!["1 + 2"]);
    }

    #[test]
    fn test_logf_formats_printf_style() {
        let (h, lines) = setup("%m");
        let logger = h.get_logger("");
        logger.logf(
            LogLevel::Info,
            "Format %d %g %s",
            &[3.into(), 2.71828.into(), "foo".into()],
        );
        assert_eq!(*lines.lock(), vec!["Format 3 2.71828 foo"]);
    }

    #[test]
    fn test_records_carry_mdc_and_location() {
        let (h, lines) = setup("%X %M:%L %m");
        let logger = h.get_logger("svc");
        mdc::clear();
        mdc::put("x", 3);
        logger.log_at(
            LogLevel::Warn,
            "msg",
            Some(Location::new("src/a.rs", 7, "svc", "svc::handler")),
        );
        mdc::clear();
        assert_eq!(*lines.lock(), vec!["{{x,3}} handler:7 msg"]);
    }

    #[test]
    fn test_parent_and_child() {
        let h = Arc::new(Hierarchy::new());
        let logger = h.get_logger("a");
        let child = logger.child("b");
        assert_eq!(child.name(), "a.b");
        assert_eq!(child.parent().map(|p| p.name().to_string()), Some("a".to_string()));
        assert_eq!(logger.parent().map(|p| p.name().to_string()), Some(String::new()));
        assert!(h.get_logger("").parent().is_none());
    }

    #[test]
    fn test_context_guard_levels_apply_to_emission() {
        let h = Hierarchy::new();
        let ctx = LogContext::with_level("quiet", LogLevel::Error).expect("push");
        assert_eq!(log_context::enabled_name_in(&h, LogLevel::Warn), None);
        assert_eq!(
            log_context::enabled_name_in(&h, LogLevel::Error),
            Some("quiet".to_string())
        );
        drop(ctx);
    }
}
