//! Console appender implementation

use crate::core::appender::ensure_line;
use crate::core::{Appender, Layout, LogEntry, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Stream a `ConsoleAppender` writes to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

impl ConsoleTarget {
    /// Accepts `System.out`/`System.err` as well as `stdout`/`stderr`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "system.out" | "stdout" | "out" => Some(ConsoleTarget::Stdout),
            "system.err" | "stderr" | "err" => Some(ConsoleTarget::Stderr),
            _ => None,
        }
    }
}

pub struct ConsoleAppender {
    name: String,
    layout: Layout,
    target: ConsoleTarget,
    use_colors: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self {
            name: "console".to_string(),
            layout: Layout::default(),
            target: ConsoleTarget::Stdout,
            use_colors: false,
        }
    }

    /// Set the layout for this appender
    ///
    /// # Example
    ///
    /// ```
    /// use rust_hierarchical_logger::appenders::ConsoleAppender;
    /// use rust_hierarchical_logger::Layout;
    ///
    /// let appender = ConsoleAppender::new()
    ///     .with_layout(Layout::pattern("%-5p %c - %m%n").unwrap());
    /// ```
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: ConsoleTarget) -> Self {
        self.target = target;
        self
    }

    /// Color whole lines by level. Has no effect without the `console` feature.
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    #[cfg(feature = "console")]
    fn colorize(&self, entry: &LogEntry, output: String) -> String {
        use colored::Colorize;
        if !self.use_colors {
            return output;
        }
        let line = output.trim_end_matches('\n');
        format!("{}\n", line.color(entry.level.color_code()))
    }

    #[cfg(not(feature = "console"))]
    fn colorize(&self, _entry: &LogEntry, output: String) -> String {
        output
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let output = self.colorize(entry, ensure_line(self.layout.format(entry)));
        match self.target {
            ConsoleTarget::Stdout => std::io::stdout().lock().write_all(output.as_bytes())?,
            ConsoleTarget::Stderr => std::io::stderr().lock().write_all(output.as_bytes())?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.target {
            ConsoleTarget::Stdout => std::io::stdout().flush()?,
            ConsoleTarget::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    #[test]
    fn test_target_names() {
        assert_eq!(ConsoleTarget::from_name("System.out"), Some(ConsoleTarget::Stdout));
        assert_eq!(ConsoleTarget::from_name("System.err"), Some(ConsoleTarget::Stderr));
        assert_eq!(ConsoleTarget::from_name(" STDERR "), Some(ConsoleTarget::Stderr));
        assert_eq!(ConsoleTarget::from_name("socket"), None);
    }

    #[test]
    fn test_console_appender_writes() {
        let mut appender = ConsoleAppender::new()
            .with_layout(Layout::Simple)
            .with_target(ConsoleTarget::Stderr)
            .with_name("CA");
        assert_eq!(appender.name(), "CA");
        assert_eq!(appender.target(), ConsoleTarget::Stderr);
        let entry = LogEntry::new(LogLevel::Info, "test", "console output");
        assert!(appender.append(&entry).is_ok());
        assert!(appender.flush().is_ok());
    }
}
