//! Configuration loading
//!
//! A [`Configuration`] describes the complete logging setup: root level and
//! appenders, per-logger levels and appenders, and the appender definitions
//! themselves. It can be built programmatically, deserialized with serde, or
//! parsed from log4j-style properties:
//!
//! ```text
//! log4j.rootLogger=DEBUG, CA
//! log4j.logger.app.db=WARN
//! log4j.appender.CA=ConsoleAppender
//! log4j.appender.CA.layout=PatternLayout
//! log4j.appender.CA.layout.ConversionPattern=%-4r [%t] %-5p %c %x - %m%n
//! ```
//!
//! Applying a configuration replaces the previous one entirely.

use super::error::{LoggerError, Result};
use super::hierarchy::{Hierarchy, SharedAppender};
use super::layout::{Layout, DEFAULT_CONVERSION_PATTERN};
use super::log_level::LogLevel;
use crate::appenders::{ConsoleAppender, ConsoleTarget, FileAppender};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Environment variable naming a properties file read by [`configure`].
pub const CONFIG_ENV: &str = "HIERARCHICAL_LOGGER_CONFIG";

/// Name of the appender installed by the default configuration.
pub const DEFAULT_APPENDER_NAME: &str = "console";

/// Level and appender references of one logger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: Option<LogLevel>,
    pub appenders: Vec<String>,
}

/// Layout of an appender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayoutConfig {
    Simple,
    /// `None` selects `%m%n`.
    Pattern { pattern: Option<String> },
}

impl LayoutConfig {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        LayoutConfig::Pattern {
            pattern: Some(pattern.into()),
        }
    }

    pub fn build(&self) -> Result<Layout> {
        match self {
            LayoutConfig::Simple => Ok(Layout::Simple),
            LayoutConfig::Pattern { pattern: None } => Ok(Layout::default()),
            LayoutConfig::Pattern {
                pattern: Some(pattern),
            } => Layout::pattern(pattern),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig::Pattern { pattern: None }
    }
}

/// Sink of an appender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AppenderKind {
    Console {
        #[serde(default)]
        target: ConsoleTarget,
        #[serde(default)]
        color: bool,
    },
    File {
        path: PathBuf,
        #[serde(default)]
        append: bool,
        #[serde(default = "default_true")]
        immediate_flush: bool,
    },
}

fn default_true() -> bool {
    true
}

/// Definition of one named appender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppenderConfig {
    pub kind: AppenderKind,
    #[serde(default)]
    pub threshold: Option<LogLevel>,
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl AppenderConfig {
    /// Console appender on stdout without colors.
    pub fn console() -> Self {
        Self {
            kind: AppenderKind::Console {
                target: ConsoleTarget::Stdout,
                color: false,
            },
            threshold: None,
            layout: LayoutConfig::default(),
        }
    }

    /// File appender truncating `path`, flushing after every record.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: AppenderKind::File {
                path: path.into(),
                append: false,
                immediate_flush: true,
            },
            threshold: None,
            layout: LayoutConfig::default(),
        }
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: LogLevel) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Only meaningful for file appenders.
    #[must_use]
    pub fn with_append(mut self, value: bool) -> Self {
        if let AppenderKind::File { append, .. } = &mut self.kind {
            *append = value;
        }
        self
    }

    #[must_use]
    pub fn with_immediate_flush(mut self, value: bool) -> Self {
        if let AppenderKind::File {
            immediate_flush, ..
        } = &mut self.kind
        {
            *immediate_flush = value;
        }
        self
    }

    /// Only meaningful for console appenders.
    #[must_use]
    pub fn with_target(mut self, value: ConsoleTarget) -> Self {
        if let AppenderKind::Console { target, .. } = &mut self.kind {
            *target = value;
        }
        self
    }

    #[must_use]
    pub fn with_color(mut self, value: bool) -> Self {
        if let AppenderKind::Console { color, .. } = &mut self.kind {
            *color = value;
        }
        self
    }

    /// Open the sink and wrap it for the registry.
    pub fn build(&self, name: &str) -> Result<SharedAppender> {
        let layout = self.layout.build()?;
        let appender: Box<dyn super::Appender> = match &self.kind {
            AppenderKind::Console { target, color } => Box::new(
                ConsoleAppender::new()
                    .with_name(name)
                    .with_layout(layout)
                    .with_target(*target)
                    .with_colors(*color),
            ),
            AppenderKind::File {
                path,
                append,
                immediate_flush,
            } => Box::new(
                FileAppender::open(path, *append)?
                    .with_name(name)
                    .with_layout(layout)
                    .with_immediate_flush(*immediate_flush),
            ),
        };
        Ok(SharedAppender::new(appender).with_threshold(self.threshold))
    }
}

/// Complete logging configuration
///
/// # Example
///
/// ```
/// use rust_hierarchical_logger::{AppenderConfig, Configuration, LayoutConfig, LogLevel};
///
/// let config = Configuration::builder()
///     .root_level(LogLevel::Info)
///     .root_appender("CA")
///     .logger_level("app.db", LogLevel::Trace)
///     .appender(
///         "CA",
///         AppenderConfig::console().with_layout(LayoutConfig::pattern("%-5p %c - %m%n")),
///     )
///     .build()
///     .unwrap();
/// assert_eq!(config.loggers["app.db"].level, Some(LogLevel::Trace));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub root: LoggerConfig,
    pub loggers: BTreeMap<String, LoggerConfig>,
    pub appenders: BTreeMap<String, AppenderConfig>,
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Root at `DEBUG` with one console appender using
    /// [`DEFAULT_CONVERSION_PATTERN`].
    pub fn default_config() -> Self {
        let mut config = Configuration::default();
        config.root = LoggerConfig {
            level: Some(LogLevel::Debug),
            appenders: vec![DEFAULT_APPENDER_NAME.to_string()],
        };
        config.appenders.insert(
            DEFAULT_APPENDER_NAME.to_string(),
            AppenderConfig::console().with_layout(LayoutConfig::pattern(DEFAULT_CONVERSION_PATTERN)),
        );
        config
    }

    /// Check everything that can be checked without opening sinks.
    pub fn validate(&self) -> Result<()> {
        for (name, appender) in &self.appenders {
            if name.trim().is_empty() {
                return Err(LoggerError::config("appender", "empty appender name"));
            }
            appender.layout.build()?;
            if let AppenderKind::File { path, .. } = &appender.kind {
                if path.as_os_str().is_empty() {
                    return Err(LoggerError::config(
                        format!("appender.{}", name),
                        "file appender without a file",
                    ));
                }
            }
        }

        let loggers = std::iter::once(("root", &self.root))
            .chain(self.loggers.iter().map(|(n, c)| (n.as_str(), c)));
        for (logger, config) in loggers {
            if let Some(missing) = config
                .appenders
                .iter()
                .find(|r| !self.appenders.contains_key(r.as_str()))
            {
                return Err(LoggerError::config(
                    format!("logger.{}", logger),
                    format!("no appender named '{}'", missing),
                ));
            }
        }
        Ok(())
    }

    /// Parse log4j-style properties text.
    pub fn from_properties(text: &str) -> Result<Self> {
        PropertiesParser::default().parse(text)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading configuration",
                format!("cannot read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_properties(&text)
    }
}

/// Builder for [`Configuration`]
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    config: Configuration,
}

impl ConfigurationBuilder {
    #[must_use = "builder methods return a new value"]
    pub fn root_level(mut self, level: LogLevel) -> Self {
        self.config.root.level = Some(level);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn root_appender(mut self, appender: impl Into<String>) -> Self {
        self.config.root.appenders.push(appender.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn logger_level(mut self, name: impl Into<String>, level: LogLevel) -> Self {
        self.config.loggers.entry(name.into()).or_default().level = Some(level);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn logger_appender(mut self, name: impl Into<String>, appender: impl Into<String>) -> Self {
        self.config
            .loggers
            .entry(name.into())
            .or_default()
            .appenders
            .push(appender.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn appender(mut self, name: impl Into<String>, appender: AppenderConfig) -> Self {
        self.config.appenders.insert(name.into(), appender);
        self
    }

    pub fn build(self) -> Result<Configuration> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Options collected for one appender before its type is known.
#[derive(Debug, Default)]
struct PendingAppender {
    kind: Option<(String, usize)>,
    /// lower-cased option name -> (value, line)
    options: BTreeMap<String, (String, usize)>,
}

#[derive(Debug, Default)]
struct PropertiesParser {
    config: Configuration,
    appenders: BTreeMap<String, PendingAppender>,
}

impl PropertiesParser {
    fn parse(mut self, text: &str) -> Result<Configuration> {
        for (line_no, key, value) in logical_lines(text)? {
            let key = key.strip_prefix("log4j.").unwrap_or(&key);
            self.apply(line_no, key, &value)?;
        }

        let appenders = std::mem::take(&mut self.appenders);
        for (name, pending) in appenders {
            let appender = build_appender(&name, pending)?;
            self.config.appenders.insert(name, appender);
        }
        self.config.validate()?;
        Ok(self.config)
    }

    fn apply(&mut self, line: usize, key: &str, value: &str) -> Result<()> {
        if key == "rootLogger" || key == "rootCategory" {
            self.config.root = parse_logger_value(line, value)?;
        } else if let Some(name) = key
            .strip_prefix("logger.")
            .or_else(|| key.strip_prefix("category."))
        {
            if name.is_empty() {
                return Err(LoggerError::parse(line, "logger key without a name"));
            }
            self.config
                .loggers
                .insert(name.to_string(), parse_logger_value(line, value)?);
        } else if let Some(rest) = key.strip_prefix("appender.") {
            let (name, option) = match rest.split_once('.') {
                Some((name, option)) => (name, Some(option)),
                None => (rest, None),
            };
            if name.is_empty() {
                return Err(LoggerError::parse(line, "appender key without a name"));
            }
            let pending = self.appenders.entry(name.to_string()).or_default();
            match option {
                None => pending.kind = Some((value.to_string(), line)),
                Some(option) if option.eq_ignore_ascii_case("type") => {
                    pending.kind = Some((value.to_string(), line))
                }
                Some(option) => {
                    pending
                        .options
                        .insert(option.to_ascii_lowercase(), (value.to_string(), line));
                }
            }
        } else {
            eprintln!(
                "[LOGGER WARNING] Ignoring unknown configuration key '{}' (line {})",
                key, line
            );
        }
        Ok(())
    }
}

/// Split properties text into `(line, key, value)` triples.
fn logical_lines(text: &str) -> Result<Vec<(usize, String, String)>> {
    let mut entries = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw.trim_start();
        let (start, mut logical) = match pending.take() {
            Some((start, so_far)) => (start, so_far + trimmed),
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (line_no, trimmed.to_string())
            }
        };

        if ends_with_continuation(&logical) {
            logical.pop();
            pending = Some((start, logical));
            continue;
        }

        entries.push(split_key_value(start, &logical)?);
    }

    if let Some((start, logical)) = pending {
        entries.push(split_key_value(start, &logical)?);
    }
    Ok(entries)
}

/// A trailing backslash continues the line unless it is itself escaped.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_key_value(line: usize, logical: &str) -> Result<(usize, String, String)> {
    let separator = logical
        .find(['=', ':'])
        .ok_or_else(|| LoggerError::parse(line, format!("expected 'key=value', got '{}'", logical)))?;
    let key = logical[..separator].trim();
    if key.is_empty() {
        return Err(LoggerError::parse(line, "empty key"));
    }
    // trailing whitespace is part of the value, as in Java properties
    let value = logical[separator + 1..].trim_start();
    Ok((line, key.to_string(), value.to_string()))
}

fn parse_level(line: usize, text: &str) -> Result<LogLevel> {
    text.parse::<LogLevel>()
        .map_err(|_| LoggerError::parse(line, format!("invalid log level '{}'", text.trim())))
}

/// `[LEVEL][, appender...]`
fn parse_logger_value(line: usize, value: &str) -> Result<LoggerConfig> {
    let mut parts = value.split(',').map(str::trim);
    let level = match parts.next() {
        None | Some("") => None,
        Some(level) if level.eq_ignore_ascii_case("inherited") || level.eq_ignore_ascii_case("null") => {
            None
        }
        Some(level) => Some(parse_level(line, level)?),
    };
    let appenders = parts.filter(|p| !p.is_empty()).map(String::from).collect();
    Ok(LoggerConfig { level, appenders })
}

fn parse_bool(line: usize, option: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(LoggerError::parse(
            line,
            format!("option '{}' expects true or false, got '{}'", option, value),
        )),
    }
}

/// Last segment of a possibly qualified class name, lower-cased.
fn class_name(value: &str) -> String {
    value
        .rsplit('.')
        .next()
        .unwrap_or(value)
        .trim()
        .to_ascii_lowercase()
}

fn build_appender(name: &str, pending: PendingAppender) -> Result<AppenderConfig> {
    let component = format!("appender.{}", name);
    let (kind, kind_line) = pending
        .kind
        .ok_or_else(|| LoggerError::config(&component, "appender has options but no type"))?;
    let mut options: HashMap<String, (String, usize)> = pending.options.into_iter().collect();

    let mut appender = match class_name(&kind).as_str() {
        "console" | "consoleappender" => AppenderConfig::console(),
        "file" | "fileappender" => {
            let (path, _) = options
                .remove("file")
                .ok_or_else(|| LoggerError::config(&component, "file appender without a file"))?;
            AppenderConfig::file(path)
        }
        _ => {
            return Err(LoggerError::parse(
                kind_line,
                format!("unsupported appender type '{}' for '{}'", kind, name),
            ))
        }
    };

    let layout_kind = options.remove("layout");
    let pattern = options
        .remove("layout.pattern")
        .or_else(|| options.remove("layout.conversionpattern"));
    appender.layout = match layout_kind {
        Some((layout, line)) => match class_name(&layout).as_str() {
            "simplelayout" | "simple" => LayoutConfig::Simple,
            "patternlayout" | "pattern" => LayoutConfig::Pattern {
                pattern: pattern.map(|(p, _)| p),
            },
            _ => {
                return Err(LoggerError::parse(
                    line,
                    format!("unsupported layout '{}' for '{}'", layout, name),
                ))
            }
        },
        None => LayoutConfig::Pattern {
            pattern: pattern.map(|(p, _)| p),
        },
    };

    let mut remaining: Vec<(String, (String, usize))> = options.into_iter().collect();
    remaining.sort_by_key(|(_, (_, line))| *line);
    for (option, (value, line)) in remaining {
        let is_file = matches!(appender.kind, AppenderKind::File { .. });
        match option.as_str() {
            "threshold" => appender.threshold = Some(parse_level(line, &value)?),
            "append" if is_file => appender = appender.with_append(parse_bool(line, &option, &value)?),
            "immediateflush" if is_file => {
                appender = appender.with_immediate_flush(parse_bool(line, &option, &value)?)
            }
            "target" if !is_file => {
                let target = ConsoleTarget::from_name(&value).ok_or_else(|| {
                    LoggerError::parse(line, format!("unknown console target '{}'", value))
                })?;
                appender = appender.with_target(target);
            }
            "color" | "colors" if !is_file => {
                appender = appender.with_color(parse_bool(line, &option, &value)?)
            }
            _ => eprintln!(
                "[LOGGER WARNING] Ignoring unknown option '{}' of appender '{}' (line {})",
                option, name, line
            ),
        }
    }
    Ok(appender)
}

fn report(result: Result<()>) -> Result<()> {
    if let Err(ref e) = result {
        eprintln!(
            "[LOGGER ERROR] Configuration rejected, previous configuration stays active: {}",
            e
        );
    }
    result
}

/// Configure the global registry from the file named by
/// `HIERARCHICAL_LOGGER_CONFIG`, or with the default configuration.
pub fn configure() -> Result<()> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if Path::new(&path).is_file() => configure_file(path),
        _ => configure_default(),
    }
}

/// Root at `DEBUG`, one console appender.
pub fn configure_default() -> Result<()> {
    configure_with(&Configuration::default_config())
}

/// Configure the global registry from properties text.
pub fn configure_prop(text: &str) -> Result<()> {
    report(Configuration::from_properties(text).and_then(|c| Hierarchy::global().configure(&c)))
}

/// Configure the global registry from a properties file.
pub fn configure_file(path: impl AsRef<Path>) -> Result<()> {
    report(Configuration::from_file(path).and_then(|c| Hierarchy::global().configure(&c)))
}

pub fn configure_with(config: &Configuration) -> Result<()> {
    report(Hierarchy::global().configure(config))
}

/// First configuration of a registry: the environment file if it loads,
/// the default configuration otherwise.
pub(crate) fn initial_configuration(hierarchy: &Hierarchy) {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        let loaded = Configuration::from_file(&path).and_then(|c| hierarchy.configure(&c));
        match loaded {
            Ok(()) => return,
            Err(e) => eprintln!(
                "[LOGGER ERROR] Cannot load '{}' from {}: {}; using default configuration",
                Path::new(&path).display(),
                CONFIG_ENV,
                e
            ),
        }
    }
    if let Err(e) = hierarchy.configure(&Configuration::default_config()) {
        eprintln!("[LOGGER ERROR] Default configuration failed: {}", e);
    }
}
