//! Bridge from the `log` facade
//!
//! Installs a [`log::Log`] implementation that forwards records of crates
//! using `log::info!` and friends into a [`Hierarchy`].
//!
//! ```no_run
//! use rust_hierarchical_logger::{LogBridge, LogLevel};
//!
//! LogBridge::new()
//!     .with_level(LogLevel::Debug)
//!     .with_target_names()
//!     .install()
//!     .expect("no other logger installed");
//!
//! log::info!(target: "app::net", "connected");
//! ```

use crate::core::log_context;
use crate::core::logger::emit;
use crate::core::{Hierarchy, LogLevel, Location, Result};
use std::borrow::Cow;
use std::sync::Arc;

/// How bridged records pick their logger name
#[derive(Debug, Clone, PartialEq, Eq)]
enum NameSource {
    /// The calling thread's current logging context
    Context,
    /// The record target, `::` replaced by `.`
    Target,
    Fixed(String),
}

#[derive(Debug)]
pub struct LogBridge {
    level: LogLevel,
    names: NameSource,
    hierarchy: Option<Arc<Hierarchy>>,
}

impl LogBridge {
    /// Forward everything to the global registry under the context name.
    pub fn new() -> Self {
        Self {
            level: LogLevel::Trace,
            names: NameSource::Context,
            hierarchy: None,
        }
    }

    /// Drop records below `level` before they reach the registry.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Send every record to the logger `name`.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names = NameSource::Fixed(name.into());
        self
    }

    /// Derive the logger name from the record target.
    #[must_use]
    pub fn with_target_names(mut self) -> Self {
        self.names = NameSource::Target;
        self
    }

    /// Forward into `hierarchy` instead of the global registry.
    #[must_use]
    pub fn with_hierarchy(mut self, hierarchy: Arc<Hierarchy>) -> Self {
        self.hierarchy = Some(hierarchy);
        self
    }

    /// Register as the `log` facade logger.
    ///
    /// Fails with `LoggerAlreadySet` if a logger is already installed.
    pub fn install(self) -> Result<()> {
        let max_level = log::LevelFilter::from(self.level);
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }

    fn hierarchy(&self) -> &Hierarchy {
        self.hierarchy
            .as_deref()
            .unwrap_or_else(|| Hierarchy::global().as_ref())
    }

    /// Logger name for `target` if a record at `level` is enabled there.
    fn enabled_name(&self, target: &str, level: LogLevel) -> Option<String> {
        if !level.passes(self.level) {
            return None;
        }
        let hierarchy = self.hierarchy();
        let name = match &self.names {
            NameSource::Context => return log_context::enabled_name_in(hierarchy, level),
            NameSource::Target => target.replace("::", "."),
            NameSource::Fixed(name) => name.clone(),
        };
        hierarchy.is_enabled_for(&name, level).then_some(name)
    }
}

impl Default for LogBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.enabled_name(metadata.target(), metadata.level().into())
            .is_some()
    }

    fn log(&self, record: &log::Record) {
        let level = LogLevel::from(record.level());
        let Some(name) = self.enabled_name(record.target(), level) else {
            return;
        };

        let location = record.file_static().map(Cow::Borrowed).or_else(|| {
            record.file().map(|f| Cow::Owned(f.to_string()))
        });
        let location = location.map(|file| {
            let module: Cow<'static, str> = match record.module_path_static() {
                Some(module) => Cow::Borrowed(module),
                None => Cow::Owned(record.module_path().unwrap_or("?").to_string()),
            };
            Location::without_function(file, record.line().unwrap_or(0), module)
        });

        emit(
            self.hierarchy(),
            &name,
            level,
            &record.args().to_string(),
            location,
        );
    }

    fn flush(&self) {
        if let Err(e) = self.hierarchy().flush() {
            eprintln!("[LOGGER ERROR] Failed to flush bridged appenders: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Appender, Layout, LogContext, LogEntry};
    use log::Log;
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

    fn setup() -> (Arc<Hierarchy>, Arc<Mutex<Vec<String>>>) {
        let hierarchy = Arc::new(Hierarchy::new());
        let lines = Arc::new(Mutex::new(Vec::new()));
        let layout = Layout::pattern("%p %c %F:%L %M %m").expect("valid pattern");
        hierarchy.add_appender("", Box::new(Lines(Arc::clone(&lines), layout)));
        (hierarchy, lines)
    }

    fn send(bridge: &LogBridge, level: log::Level, target: &str, message: &str) {
        bridge.log(
            &log::Record::builder()
                .args(format_args!("{}", message))
                .level(level)
                .target(target)
                .file_static(Some("src/net.rs"))
                .line(Some(12))
                .module_path_static(Some("app::net"))
                .build(),
        );
    }

    #[test]
    fn test_target_names() {
        let (h, lines) = setup();
        let bridge = LogBridge::new().with_target_names().with_hierarchy(Arc::clone(&h));
        send(&bridge, log::Level::Warn, "app::net", "slow peer");
        send(&bridge, log::Level::Debug, "app::net", "filtered by registry");
        assert_eq!(*lines.lock(), vec!["WARN app.net src/net.rs:12 ? slow peer"]);
    }

    #[test]
    fn test_fixed_name_and_bridge_level() {
        let (h, lines) = setup();
        h.set_level("", LogLevel::Trace);
        let bridge = LogBridge::new()
            .with_name("bridged")
            .with_level(LogLevel::Info)
            .with_hierarchy(Arc::clone(&h));
        send(&bridge, log::Level::Debug, "x", "below bridge level");
        send(&bridge, log::Level::Error, "x", "kept");
        assert_eq!(*lines.lock(), vec!["ERROR bridged src/net.rs:12 ? kept"]);
    }

    #[test]
    fn test_context_names_by_default() {
        let (h, lines) = setup();
        let bridge = LogBridge::new().with_hierarchy(Arc::clone(&h));
        {
            let _ctx = LogContext::new("worker").expect("push");
            send(&bridge, log::Level::Info, "ignored::target", "in context");
        }
        send(&bridge, log::Level::Info, "ignored::target", "at root");
        assert_eq!(
            *lines.lock(),
            vec![
                "INFO worker src/net.rs:12 ? in context",
                "INFO root src/net.rs:12 ? at root",
            ]
        );
    }

    #[test]
    fn test_enabled_reflects_thresholds() {
        let (h, _) = setup();
        let bridge = LogBridge::new().with_target_names().with_hierarchy(Arc::clone(&h));
        let metadata = log::Metadata::builder()
            .level(log::Level::Trace)
            .target("app")
            .build();
        assert!(!bridge.enabled(&metadata));
        h.set_level("app", LogLevel::Trace);
        assert!(bridge.enabled(&metadata));
    }
}
