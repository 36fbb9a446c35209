//! File appender implementation

use crate::core::appender::ensure_line;
use crate::core::{Appender, Layout, LogEntry, LoggerError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct FileAppender {
    name: String,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    layout: Layout,
    immediate_flush: bool,
}

impl FileAppender {
    /// Open `path` for writing, truncating existing content.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(path, false)
    }

    /// Open `path`, appending to existing content when `append` is set.
    ///
    /// Missing parent directories are created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rust_hierarchical_logger::appenders::FileAppender;
    /// use rust_hierarchical_logger::Layout;
    ///
    /// let appender = FileAppender::open("/var/log/app.log", true)
    ///     .unwrap()
    ///     .with_layout(Layout::Simple);
    /// ```
    pub fn open(path: impl Into<PathBuf>, append: bool) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                LoggerError::file_appender(path.display().to_string(), e.to_string())
            })?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        let file = options
            .open(&path)
            .map_err(|e| LoggerError::file_appender(path.display().to_string(), e.to_string()))?;

        Ok(Self {
            name: "file".to_string(),
            path,
            writer: Some(BufWriter::new(file)),
            layout: Layout::default(),
            immediate_flush: true,
        })
    }

    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Flush after every record (default) or leave it to the buffer.
    #[must_use]
    pub fn with_immediate_flush(mut self, immediate_flush: bool) -> Self {
        self.immediate_flush = immediate_flush;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Appender for FileAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("File writer not initialized"))?;

        let output = ensure_line(self.layout.format(entry));
        writer.write_all(output.as_bytes())?;
        if self.immediate_flush {
            writer.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use tempfile::TempDir;

    fn write_line(appender: &mut FileAppender, level: LogLevel, message: &str) {
        appender
            .append(&LogEntry::new(level, "test", message))
            .expect("append");
    }

    #[test]
    fn test_truncates_by_default() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("out.log");
        std::fs::write(&path, "stale\n").expect("seed file");

        let mut appender = FileAppender::new(&path).expect("open").with_layout(Layout::Simple);
        write_line(&mut appender, LogLevel::Info, "fresh");
        drop(appender);

        assert_eq!(std::fs::read_to_string(&path).expect("read"), "INFO - fresh\n");
    }

    #[test]
    fn test_append_mode_keeps_content() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("out.log");
        std::fs::write(&path, "first\n").expect("seed file");

        let mut appender = FileAppender::open(&path, true)
            .expect("open")
            .with_layout(Layout::Simple);
        write_line(&mut appender, LogLevel::Warn, "second");
        drop(appender);

        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            "first\nWARN - second\n"
        );
    }

    #[test]
    fn test_immediate_flush_makes_lines_visible() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested/dir/out.log");
        let mut appender = FileAppender::new(&path).expect("open");
        assert_eq!(appender.path(), path.as_path());

        write_line(&mut appender, LogLevel::Error, "visible");
        // no explicit flush, no drop
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "visible\n");
    }

    #[test]
    fn test_buffered_until_flush() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("buffered.log");
        let mut appender = FileAppender::new(&path)
            .expect("open")
            .with_immediate_flush(false);

        write_line(&mut appender, LogLevel::Info, "pending");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "");
        appender.flush().expect("flush");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "pending\n");
    }

    #[test]
    fn test_unopenable_path_is_file_appender_error() {
        let dir = TempDir::new().expect("temp dir");
        // a directory cannot be opened as a log file
        let err = FileAppender::new(dir.path()).err().expect("must fail");
        assert!(matches!(err, LoggerError::FileAppenderError { .. }));
    }
}
