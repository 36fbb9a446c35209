//! Hierarchical logger registry
//!
//! Loggers are identified by dotted names; `""` is the root. Each logger may
//! carry an explicit level and a list of appenders. A logger without an
//! explicit level inherits the level of its nearest ancestor, and records
//! go to the appenders of the nearest logger (itself included) that has any.
//!
//! All state lives in an immutable [`Snapshot`] behind an `RwLock`. Writers
//! clone the snapshot, modify the copy and swap it in, so readers never see
//! a half-applied configuration and never block on appender I/O.

use super::appender::Appender;
use super::config::{self, Configuration};
use super::error::Result;
use super::log_entry::{self, LogEntry};
use super::log_level::LogLevel;
use super::logger::Logger;
use super::metrics::LoggerMetrics;
use parking_lot::{Mutex, RwLock};
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Parent name of `name`, `None` for the root.
pub fn parent_name(name: &str) -> Option<&str> {
    if name.is_empty() {
        None
    } else {
        Some(name.rfind('.').map_or("", |i| &name[..i]))
    }
}

/// `name` followed by each of its ancestors, ending with the root.
pub fn ancestors(name: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(name), |&current| parent_name(current))
}

/// Appender shared by every logger it is attached to
///
/// Writes are serialized by a mutex. The first failure of an appender is
/// reported on stderr; later failures are only counted.
pub struct SharedAppender {
    name: String,
    threshold: Option<LogLevel>,
    inner: Mutex<Box<dyn Appender>>,
    reported: AtomicBool,
}

impl SharedAppender {
    pub fn new(appender: Box<dyn Appender>) -> Self {
        Self {
            name: appender.name().to_string(),
            threshold: None,
            inner: Mutex::new(appender),
            reported: AtomicBool::new(false),
        }
    }

    /// Records below `threshold` are ignored by this appender.
    #[must_use]
    pub fn with_threshold(mut self, threshold: Option<LogLevel>) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn threshold(&self) -> Option<LogLevel> {
        self.threshold
    }

    fn accepts(&self, level: LogLevel) -> bool {
        self.threshold.map_or(true, |t| level.passes(t))
    }

    /// Per-appender panic isolation: a failing appender never affects
    /// other appenders or the caller.
    fn append(&self, entry: &LogEntry, metrics: &LoggerMetrics) {
        let mut appender = self.inner.lock();
        let result =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| appender.append(entry)));
        match result {
            Ok(Ok(())) => {
                metrics.record_write();
            }
            Ok(Err(e)) => {
                metrics.record_sink_error();
                if !self.reported.swap(true, Ordering::Relaxed) {
                    eprintln!("[LOGGER ERROR] Appender '{}' failed: {}", self.name, e);
                }
            }
            Err(panic_info) => {
                metrics.record_sink_error();
                if !self.reported.swap(true, Ordering::Relaxed) {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender '{}' panicked: {}. \
                         Other appenders continue to function.",
                        self.name,
                        panic_message(panic_info.as_ref())
                    );
                }
            }
        }
    }

    fn flush(&self, metrics: &LoggerMetrics) -> Result<()> {
        let mut appender = self.inner.lock();
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| appender.flush())) {
            Ok(result) => result.inspect_err(|_| {
                metrics.record_sink_error();
            }),
            Err(panic_info) => {
                metrics.record_sink_error();
                eprintln!(
                    "[LOGGER CRITICAL] Appender '{}' panicked during flush: {}",
                    self.name,
                    panic_message(panic_info.as_ref())
                );
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for SharedAppender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedAppender")
            .field("name", &self.name)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct LoggerNode {
    pub(crate) level: Option<LogLevel>,
    pub(crate) appenders: Vec<Arc<SharedAppender>>,
}

/// Immutable view of the registry
#[derive(Debug, Default)]
pub struct Snapshot {
    nodes: HashMap<String, LoggerNode>,
    /// memoized effective levels, valid for this snapshot only
    cache: RwLock<HashMap<String, LogLevel>>,
}

impl Clone for Snapshot {
    /// Copy the nodes; the memo starts empty.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            cache: RwLock::new(HashMap::new()),
        }
    }
}

impl Snapshot {
    fn with_root() -> Self {
        let mut snapshot = Self::default();
        snapshot.nodes.insert(String::new(), LoggerNode::default());
        snapshot
    }

    fn effective_level(&self, name: &str) -> LogLevel {
        if let Some(level) = self.cache.read().get(name) {
            return *level;
        }
        let level = ancestors(name)
            .find_map(|n| self.nodes.get(n).and_then(|node| node.level))
            .unwrap_or_default();
        self.cache.write().insert(name.to_string(), level);
        level
    }

    fn appenders_for(&self, name: &str) -> &[Arc<SharedAppender>] {
        ancestors(name)
            .filter_map(|n| self.nodes.get(n))
            .find(|node| !node.appenders.is_empty())
            .map(|node| node.appenders.as_slice())
            .unwrap_or(&[])
    }

    /// Every distinct appender, each once.
    fn all_appenders(&self) -> Vec<Arc<SharedAppender>> {
        let mut seen: Vec<Arc<SharedAppender>> = Vec::new();
        for appender in self.nodes.values().flat_map(|n| n.appenders.iter()) {
            if !seen.iter().any(|a| Arc::ptr_eq(a, appender)) {
                seen.push(Arc::clone(appender));
            }
        }
        seen
    }
}

/// Logger registry
///
/// # Example
///
/// ```
/// use rust_hierarchical_logger::{Hierarchy, LogLevel};
///
/// let hierarchy = Hierarchy::new();
/// hierarchy.set_level("app", LogLevel::Warn);
/// assert_eq!(hierarchy.effective_level("app.db.pool"), LogLevel::Warn);
/// assert_eq!(hierarchy.effective_level("other"), LogLevel::Info);
/// ```
#[derive(Debug)]
pub struct Hierarchy {
    state: RwLock<Arc<Snapshot>>,
    metrics: LoggerMetrics,
}

static GLOBAL: OnceLock<Arc<Hierarchy>> = OnceLock::new();

thread_local! {
    /// Set while this thread is inside an appender call.
    static IN_APPENDER: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside an appender until dropped.
struct AppenderScope;

impl AppenderScope {
    /// `None` if the thread is already inside an appender.
    fn enter() -> Option<Self> {
        IN_APPENDER
            .with(|flag| !flag.replace(true))
            .then_some(AppenderScope)
    }
}

impl Drop for AppenderScope {
    fn drop(&mut self) {
        IN_APPENDER.with(|flag| flag.set(false));
    }
}

impl Hierarchy {
    /// Empty registry: no levels set, no appenders.
    pub fn new() -> Self {
        log_entry::process_start();
        Self {
            state: RwLock::new(Arc::new(Snapshot::with_root())),
            metrics: LoggerMetrics::new(),
        }
    }

    /// Process-wide registry used by the free functions and macros.
    ///
    /// Configured on first use from the file named by
    /// `HIERARCHICAL_LOGGER_CONFIG`, or with the default configuration.
    pub fn global() -> &'static Arc<Hierarchy> {
        GLOBAL.get_or_init(|| {
            let hierarchy = Hierarchy::new();
            config::initial_configuration(&hierarchy);
            Arc::new(hierarchy)
        })
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state.read())
    }

    /// Copy-on-write update of the current snapshot.
    fn update<R>(&self, f: impl FnOnce(&mut Snapshot) -> R) -> R {
        let mut state = self.state.write();
        let mut next = Snapshot::clone(&state);
        let result = f(&mut next);
        *state = Arc::new(next);
        result
    }

    fn node_mut<'a>(snapshot: &'a mut Snapshot, name: &str) -> &'a mut LoggerNode {
        snapshot.nodes.entry(name.to_string()).or_default()
    }

    /// Register `name` if it is not known yet.
    fn ensure_logger(&self, name: &str) {
        if !self.state.read().nodes.contains_key(name) {
            self.update(|s| {
                Self::node_mut(s, name);
            });
        }
    }

    /// Handle for the logger `name`, creating it on first use.
    pub fn get_logger(self: &Arc<Self>, name: &str) -> Logger {
        self.ensure_logger(name);
        Logger::new(name, Arc::clone(self))
    }

    /// Names of all known loggers, sorted; the root is `""`.
    pub fn logger_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().nodes.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn set_level(&self, name: &str, level: LogLevel) {
        self.update(|s| Self::node_mut(s, name).level = Some(level));
    }

    /// Remove the explicit level of `name` so it inherits again.
    pub fn clear_level(&self, name: &str) {
        self.update(|s| Self::node_mut(s, name).level = None);
    }

    /// Explicit level of `name`, if set.
    pub fn level(&self, name: &str) -> Option<LogLevel> {
        self.state.read().nodes.get(name).and_then(|n| n.level)
    }

    /// Level of the nearest ancestor (inclusive) with an explicit level,
    /// `Info` when none is set.
    pub fn effective_level(&self, name: &str) -> LogLevel {
        self.snapshot().effective_level(name)
    }

    pub fn is_enabled_for(&self, name: &str, level: LogLevel) -> bool {
        level.passes(self.effective_level(name))
    }

    pub fn add_appender(&self, name: &str, appender: Box<dyn Appender>) {
        self.attach(name, Arc::new(SharedAppender::new(appender)));
    }

    /// Attach an already shared appender, e.g. one used by several loggers.
    pub fn attach(&self, name: &str, appender: Arc<SharedAppender>) {
        self.update(|s| Self::node_mut(s, name).appenders.push(appender));
    }

    pub fn clear_appenders(&self, name: &str) {
        let removed = self.update(|s| std::mem::take(&mut Self::node_mut(s, name).appenders));
        self.flush_all(&removed);
    }

    /// Names of the appenders attached directly to `name`.
    pub fn appender_names(&self, name: &str) -> Vec<String> {
        self.state
            .read()
            .nodes
            .get(name)
            .map(|n| n.appenders.iter().map(|a| a.name().to_string()).collect())
            .unwrap_or_default()
    }

    /// Apply `config`, replacing every level and appender.
    ///
    /// The configuration is validated before anything changes: on error the
    /// previous configuration stays active. Appenders whose sink cannot be
    /// opened are reported, counted as sink errors and left out. Known
    /// logger names survive the reconfiguration.
    pub fn configure(&self, config: &Configuration) -> Result<()> {
        config.validate()?;

        let mut opened: HashMap<&str, Arc<SharedAppender>> = HashMap::new();
        for (name, appender_config) in &config.appenders {
            match appender_config.build(name) {
                Ok(appender) => {
                    opened.insert(name.as_str(), Arc::new(appender));
                }
                Err(e) => {
                    self.metrics.record_sink_error();
                    eprintln!("[LOGGER ERROR] Appender '{}' disabled: {}", name, e);
                }
            }
        }

        let mut next = Snapshot::with_root();
        for name in self.state.read().nodes.keys() {
            next.nodes.insert(name.clone(), LoggerNode::default());
        }
        let loggers = std::iter::once(("", &config.root))
            .chain(config.loggers.iter().map(|(n, c)| (n.as_str(), c)));
        for (name, logger_config) in loggers {
            let node = Self::node_mut(&mut next, name);
            node.level = logger_config.level;
            node.appenders = logger_config
                .appenders
                .iter()
                .filter_map(|r| opened.get(r.as_str()).cloned())
                .collect();
        }

        let previous = std::mem::replace(&mut *self.state.write(), Arc::new(next));
        self.flush_all(&previous.all_appenders());
        Ok(())
    }

    /// Forget every level and appender, keeping the known logger names.
    pub fn reset(&self) {
        let previous = self.update(|s| {
            let old = s.all_appenders();
            for node in s.nodes.values_mut() {
                *node = LoggerNode::default();
            }
            old
        });
        self.flush_all(&previous);
    }

    /// Write `entry` to the appenders of the nearest logger that has any.
    ///
    /// Records emitted by an appender while it writes (directly or through
    /// the `log` bridge) are dropped: the appender's lock is already held.
    pub fn dispatch(&self, entry: &LogEntry) {
        let Some(_scope) = AppenderScope::enter() else {
            self.metrics.record_dropped();
            return;
        };
        self.ensure_logger(&entry.logger_name);
        let snapshot = self.snapshot();
        let appenders = snapshot.appenders_for(&entry.logger_name);
        if appenders.is_empty() {
            self.metrics.record_dropped();
            return;
        }
        self.metrics.record_logged(entry.level);
        for appender in appenders.iter().filter(|a| a.accepts(entry.level)) {
            appender.append(entry, &self.metrics);
        }
    }

    /// Flush every appender, returning the first error.
    ///
    /// A no-op when called from inside an appender.
    pub fn flush(&self) -> Result<()> {
        let Some(_scope) = AppenderScope::enter() else {
            return Ok(());
        };
        let appenders = self.snapshot().all_appenders();
        let mut first_error = None;
        for appender in &appenders {
            if let Err(e) = appender.flush(&self.metrics) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn flush_all(&self, appenders: &[Arc<SharedAppender>]) {
        for appender in appenders {
            if let Err(e) = appender.flush(&self.metrics) {
                eprintln!(
                    "[LOGGER ERROR] Failed to flush appender '{}': {}",
                    appender.name(),
                    e
                );
            }
        }
    }

    /// Get the registry metrics for detailed observability
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LoggerError;

    /// Appender collecting messages in memory.
    struct Collect {
        name: String,
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl Appender for Collect {
        fn append(&mut self, entry: &LogEntry) -> Result<()> {
            self.lines
                .lock()
                .push(format!("{} {} {}", entry.logger_name, entry.level, entry.message));
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    fn collector(name: &str) -> (Box<dyn Appender>, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let appender = Collect {
            name: name.to_string(),
            lines: Arc::clone(&lines),
        };
        (Box::new(appender), lines)
    }

    struct Failing;

    impl Appender for Failing {
        fn append(&mut self, _entry: &LogEntry) -> Result<()> {
            Err(LoggerError::writer("sink closed"))
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct Panicking;

    impl Appender for Panicking {
        fn append(&mut self, _entry: &LogEntry) -> Result<()> {
            panic!("appender exploded");
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[test]
    fn test_ancestors() {
        let chain: Vec<&str> = ancestors("a.b.c").collect();
        assert_eq!(chain, vec!["a.b.c", "a.b", "a", ""]);
        assert_eq!(ancestors("").collect::<Vec<_>>(), vec![""]);
        assert_eq!(parent_name("a"), Some(""));
        assert_eq!(parent_name(""), None);
    }

    #[test]
    fn test_level_inheritance() {
        let h = Hierarchy::new();
        assert_eq!(h.effective_level("x.y"), LogLevel::Info);

        h.set_level("", LogLevel::Error);
        h.set_level("x", LogLevel::Debug);
        assert_eq!(h.effective_level("x.y.z"), LogLevel::Debug);
        assert_eq!(h.effective_level("w"), LogLevel::Error);
        assert_eq!(h.level("x.y"), None);

        h.clear_level("x");
        assert_eq!(h.effective_level("x.y.z"), LogLevel::Error);
        assert!(h.is_enabled_for("x", LogLevel::Fatal));
        assert!(!h.is_enabled_for("x", LogLevel::Warn));
    }

    #[test]
    fn test_cache_invalidated_by_mutation() {
        let h = Hierarchy::new();
        assert_eq!(h.effective_level("a.b"), LogLevel::Info);
        h.set_level("a", LogLevel::Trace);
        assert_eq!(h.effective_level("a.b"), LogLevel::Trace);
    }

    #[test]
    fn test_get_logger_registers_name() {
        let h = Arc::new(Hierarchy::new());
        let logger = h.get_logger("svc.api");
        assert_eq!(logger.name(), "svc.api");
        assert_eq!(h.logger_names(), vec!["".to_string(), "svc.api".to_string()]);
    }

    #[test]
    fn test_dispatch_uses_nearest_appenders() {
        let h = Hierarchy::new();
        let (root, root_lines) = collector("root");
        let (db, db_lines) = collector("db");
        h.add_appender("", root);
        h.add_appender("app.db", db);

        h.dispatch(&LogEntry::new(LogLevel::Info, "app.db.pool", "to db"));
        h.dispatch(&LogEntry::new(LogLevel::Info, "app.web", "to root"));

        assert_eq!(*db_lines.lock(), vec!["app.db.pool INFO to db"]);
        assert_eq!(*root_lines.lock(), vec!["app.web INFO to root"]);
        assert_eq!(h.appender_names("app.db"), vec!["db"]);
        assert_eq!(h.metrics().total_logged(), 2);
    }

    #[test]
    fn test_dispatch_without_appenders_counts_drop() {
        let h = Hierarchy::new();
        h.dispatch(&LogEntry::new(LogLevel::Error, "", "nowhere"));
        assert_eq!(h.metrics().dropped_count(), 1);
    }

    #[test]
    fn test_appender_threshold_filters() {
        let h = Hierarchy::new();
        let (boxed, lines) = collector("errors");
        h.attach(
            "",
            Arc::new(SharedAppender::new(boxed).with_threshold(Some(LogLevel::Error))),
        );
        h.dispatch(&LogEntry::new(LogLevel::Warn, "", "skipped"));
        h.dispatch(&LogEntry::new(LogLevel::Fatal, "", "kept"));
        assert_eq!(*lines.lock(), vec![" FATAL kept"]);
    }

    #[test]
    fn test_failing_and_panicking_appenders_are_isolated() {
        let h = Hierarchy::new();
        let (good, lines) = collector("good");
        h.add_appender("", Box::new(Failing));
        h.add_appender("", Box::new(Panicking));
        h.add_appender("", good);

        h.dispatch(&LogEntry::new(LogLevel::Info, "", "first"));
        h.dispatch(&LogEntry::new(LogLevel::Info, "", "second"));

        assert_eq!(lines.lock().len(), 2);
        assert_eq!(h.metrics().sink_error_count(), 4);
        assert_eq!(h.metrics().appender_writes(), 2);
    }

    #[test]
    fn test_reset_keeps_names() {
        let h = Arc::new(Hierarchy::new());
        let _ = h.get_logger("kept");
        h.set_level("kept", LogLevel::Fatal);
        let (boxed, _) = collector("c");
        h.add_appender("kept", boxed);

        h.reset();
        assert!(h.logger_names().contains(&"kept".to_string()));
        assert_eq!(h.level("kept"), None);
        assert!(h.appender_names("kept").is_empty());
    }

    /// Appender that logs through its own registry while writing.
    struct Chatty {
        logger: Logger,
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl Appender for Chatty {
        fn append(&mut self, entry: &LogEntry) -> Result<()> {
            self.logger.warn("written from inside an appender");
            self.logger.flush()?;
            self.lines.lock().push(entry.message.clone());
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "chatty"
        }
    }

    #[test]
    fn test_logging_from_appender_is_dropped() {
        let h = Arc::new(Hierarchy::new());
        let lines = Arc::new(Mutex::new(Vec::new()));
        h.add_appender(
            "",
            Box::new(Chatty {
                logger: h.get_logger("inner"),
                lines: Arc::clone(&lines),
            }),
        );

        h.get_logger("outer").info("outer record");
        h.get_logger("outer").info("second record");

        assert_eq!(*lines.lock(), vec!["outer record", "second record"]);
        assert_eq!(h.metrics().total_logged(), 2);
        assert_eq!(h.metrics().dropped_count(), 2);
        assert_eq!(h.metrics().sink_error_count(), 0);
        h.clear_appenders("");
    }

    #[test]
    fn test_relative_time_starts_with_registry() {
        let _h = Hierarchy::new();
        std::thread::sleep(std::time::Duration::from_millis(20));
        let entry = LogEntry::new(LogLevel::Info, "", "later");
        assert!(entry.relative_millis() >= 20);
    }
}
