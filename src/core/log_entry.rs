//! Log entry structure

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::cell::RefCell;
use std::sync::OnceLock;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

static PROCESS_START: OnceLock<DateTime<Utc>> = OnceLock::new();

/// Instant logging started in this process, reference point for `%r`.
pub fn process_start() -> DateTime<Utc> {
    *PROCESS_START.get_or_init(Utc::now)
}

/// Get cached thread ID, computing and caching it on first access
fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

/// Get cached thread name, computing and caching it on first access
fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// Source location of a log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: Cow<'static, str>,
    pub line: u32,
    pub module_path: Cow<'static, str>,
    /// Fully qualified path of the enclosing function, if known.
    pub function: Option<Cow<'static, str>>,
}

impl Location {
    pub fn new(
        file: &'static str,
        line: u32,
        module_path: &'static str,
        function: &'static str,
    ) -> Self {
        Self {
            file: Cow::Borrowed(file),
            line,
            module_path: Cow::Borrowed(module_path),
            function: Some(Cow::Borrowed(function)),
        }
    }

    /// Location without function information, e.g. records from the `log` bridge.
    pub fn without_function(
        file: impl Into<Cow<'static, str>>,
        line: u32,
        module_path: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            module_path: module_path.into(),
            function: None,
        }
    }

    /// Bare name of the enclosing function.
    ///
    /// Closure frames (`::{{closure}}`) are skipped so a call inside a
    /// closure reports the function that defines it.
    pub fn function_name(&self) -> Option<&str> {
        let mut path: &str = self.function.as_deref()?;
        while let Some(stripped) = path.strip_suffix("::{{closure}}") {
            path = stripped;
        }
        Some(path.rsplit("::").next().unwrap_or(path))
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    /// Dotted logger name, empty for the root logger.
    pub logger_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub location: Option<Location>,
    pub thread_id: String,
    pub thread_name: Option<String>,
    /// MDC entries rendered to text at emit time, in insertion order.
    pub mdc: Vec<(String, String)>,
}

impl LogEntry {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// to prevent attackers from injecting fake log entries.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, logger_name: impl Into<String>, message: impl AsRef<str>) -> Self {
        Self {
            level,
            logger_name: logger_name.into(),
            message: Self::sanitize_message(message.as_ref()),
            timestamp: Utc::now(),
            location: None,
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
            mdc: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_mdc(mut self, mdc: Vec<(String, String)>) -> Self {
        self.mdc = mdc;
        self
    }

    /// Thread name, falling back to the thread id for unnamed threads.
    pub fn thread_label(&self) -> &str {
        self.thread_name.as_deref().unwrap_or(&self.thread_id)
    }

    /// Milliseconds elapsed between logging start and this record.
    pub fn relative_millis(&self) -> i64 {
        (self.timestamp - process_start()).num_milliseconds().max(0)
    }
}
