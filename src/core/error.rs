//! Error types of the logger, its configuration and its appenders

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Malformed line in property-style configuration text
    #[error("Configuration parse error at line {line}: {message}")]
    ConfigParse { line: usize, message: String },

    /// Unparseable layout conversion pattern
    #[error("Invalid conversion pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// File appender error with path
    #[error("File appender error for '{path}': {message}")]
    FileAppenderError { path: String, message: String },

    /// Empty or multi-level logging context name
    #[error("Invalid logging context name '{0}': must be non-empty and must not contain '.'")]
    InvalidContextName(String),

    /// Context exit without a matching enter
    #[error("Logging context stack underflow: pop without matching push")]
    ContextUnderflow,

    /// A `log` facade logger was already installed
    #[error("A logger is already installed for the `log` facade")]
    LoggerAlreadySet,

    /// Appender write without an open sink
    #[error("Writer error: {0}")]
    WriterError(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a configuration parse error for a 1-based line number
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        LoggerError::ConfigParse {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid pattern error
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a file appender error
    pub fn file_appender(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileAppenderError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Whether this error stems from configuration input rather than a sink.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidConfiguration { .. }
                | LoggerError::ConfigParse { .. }
                | LoggerError::InvalidPattern { .. }
        )
    }
}

impl From<log::SetLoggerError> for LoggerError {
    fn from(_: log::SetLoggerError) -> Self {
        LoggerError::LoggerAlreadySet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("appender.FA", "missing file");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert!(err.is_configuration_error());

        let err = LoggerError::file_appender("/var/log/app.log", "Permission denied");
        assert!(matches!(err, LoggerError::FileAppenderError { .. }));
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::parse(3, "missing '='");
        assert_eq!(
            err.to_string(),
            "Configuration parse error at line 3: missing '='"
        );

        let err = LoggerError::pattern("%q", "unknown conversion character 'q'");
        assert_eq!(
            err.to_string(),
            "Invalid conversion pattern '%q': unknown conversion character 'q'"
        );

        let err = LoggerError::InvalidContextName("x.y".to_string());
        assert!(err.to_string().contains("'x.y'"));
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("opening log file", "cannot open", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("opening log file"));
        assert!(err.to_string().contains("cannot open"));
    }
}
