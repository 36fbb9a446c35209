//! Appender trait for log output destinations

use super::{error::Result, log_entry::LogEntry};

/// Output destination for formatted records.
///
/// Appenders are owned by the registry behind a per-appender mutex, so
/// `append` and `flush` are never called concurrently on one instance.
/// Errors returned here are reported by the registry and never reach the
/// code that emitted the record.
pub trait Appender: Send + Sync {
    fn append(&mut self, entry: &LogEntry) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

/// Terminate a formatted record with exactly one newline.
pub(crate) fn ensure_line(mut output: String) -> String {
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_line() {
        assert_eq!(ensure_line("a".to_string()), "a\n");
        assert_eq!(ensure_line("a\n".to_string()), "a\n");
        assert_eq!(ensure_line(String::new()), "\n");
    }
}
