//! Layouts turning a `LogEntry` into text
//!
//! Two layouts exist:
//! - `Layout::Simple`: `LEVEL - message`
//! - `Layout::Pattern`: log4j conversion patterns such as
//!   `%d{ISO8601} [%t] %-5p %c - %m%n`
//!
//! A pattern is parsed once into segments; rendering never fails. Location
//! fields that are unknown for a record (records from the `log` bridge carry
//! no function name, for instance) render as `?`.

use super::error::{LoggerError, Result};
use super::log_entry::LogEntry;
use super::timestamp::TimestampFormat;
use std::fmt::{self, Write};

/// Pattern used when a `PatternLayout` is configured without one.
pub const DEFAULT_PATTERN: &str = "%m%n";

/// Pattern of the console appender installed by the default configuration.
pub const DEFAULT_CONVERSION_PATTERN: &str = "%r [%t] %p %c %M - %m%n";

/// Name rendered by `%c` for the root logger.
pub const ROOT_LOGGER_NAME: &str = "root";

/// `%x` output. No nested diagnostic context is kept, so it always renders
/// the way log4j renders an empty one.
const EMPTY_NDC: &str = "null";

#[derive(Debug, Clone, PartialEq)]
enum Conversion {
    Level,
    /// `%c{n}`: keep the last `n` name segments
    Logger(Option<usize>),
    ModulePath,
    Method,
    File,
    Line,
    Location,
    Message,
    /// `%X` or `%X{key}`
    Mdc(Option<String>),
    /// `%x`, accepted for log4j compatibility
    Ndc,
    Thread,
    Relative,
    Date(TimestampFormat),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Padding {
    left_align: bool,
    min: Option<usize>,
    max: Option<usize>,
}

impl Padding {
    fn is_plain(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    fn apply(&self, out: &mut String, text: &str) {
        let text = match self.max {
            // truncation keeps the rightmost characters
            Some(max) if text.chars().count() > max => {
                let skip = text.chars().count() - max;
                let start = text.char_indices().nth(skip).map_or(text.len(), |(i, _)| i);
                &text[start..]
            }
            _ => text,
        };
        let fill = self
            .min
            .map_or(0, |min| min.saturating_sub(text.chars().count()));
        if self.left_align {
            out.push_str(text);
            out.extend(std::iter::repeat(' ').take(fill));
        } else {
            out.extend(std::iter::repeat(' ').take(fill));
            out.push_str(text);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Conversion(Conversion, Padding),
}

/// Parsed log4j conversion pattern
///
/// # Example
///
/// ```
/// use rust_hierarchical_logger::core::{LogEntry, LogLevel, PatternLayout};
///
/// let layout = PatternLayout::parse("%-5p %c - %m%n").unwrap();
/// let entry = LogEntry::new(LogLevel::Info, "app.db", "connected");
/// assert_eq!(layout.format(&entry), "INFO  app.db - connected\n");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PatternLayout {
    pattern: String,
    segments: Vec<Segment>,
}

impl PatternLayout {
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }

            let mut padding = Padding::default();
            if chars.peek() == Some(&'-') {
                padding.left_align = true;
                chars.next();
            }
            padding.min = take_number(&mut chars);
            if chars.peek() == Some(&'.') {
                chars.next();
                padding.max = Some(take_number(&mut chars).ok_or_else(|| {
                    LoggerError::pattern(pattern, "expected digits after '.'")
                })?);
            }

            let conversion = chars
                .next()
                .ok_or_else(|| LoggerError::pattern(pattern, "dangling '%' at end of pattern"))?;

            let option = if chars.peek() == Some(&'{') {
                chars.next();
                let mut option = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => option.push(ch),
                        None => {
                            return Err(LoggerError::pattern(pattern, "unterminated '{' option"))
                        }
                    }
                }
                Some(option)
            } else {
                None
            };

            let kind = match conversion {
                '%' | 'n' => {
                    literal.push(if conversion == 'n' { '\n' } else { '%' });
                    continue;
                }
                'p' => Conversion::Level,
                'c' => Conversion::Logger(parse_precision(pattern, option.as_deref())?),
                'C' => Conversion::ModulePath,
                'M' => Conversion::Method,
                'F' => Conversion::File,
                'L' => Conversion::Line,
                'l' => Conversion::Location,
                'm' => Conversion::Message,
                'X' => Conversion::Mdc(option.filter(|key| !key.is_empty())),
                'x' => Conversion::Ndc,
                't' => Conversion::Thread,
                'r' => Conversion::Relative,
                'd' => Conversion::Date(TimestampFormat::from_option(option.as_deref())),
                other => {
                    return Err(LoggerError::pattern(
                        pattern,
                        format!("unknown conversion character '{}'", other),
                    ))
                }
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Conversion(kind, padding));
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    /// Source text of the pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn format(&self, entry: &LogEntry) -> String {
        let mut out = String::with_capacity(self.pattern.len() + entry.message.len() + 32);
        let mut scratch = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Conversion(kind, padding) if padding.is_plain() => {
                    // writing to a String cannot fail
                    let _ = render(&mut out, kind, entry);
                }
                Segment::Conversion(kind, padding) => {
                    scratch.clear();
                    let _ = render(&mut scratch, kind, entry);
                    padding.apply(&mut out, &scratch);
                }
            }
        }
        out
    }
}

impl Default for PatternLayout {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            segments: vec![
                Segment::Conversion(Conversion::Message, Padding::default()),
                Segment::Literal("\n".to_string()),
            ],
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits.parse().ok()
}

fn parse_precision(pattern: &str, option: Option<&str>) -> Result<Option<usize>> {
    match option.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => match text.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(LoggerError::pattern(
                pattern,
                format!("invalid logger precision '{}'", text),
            )),
        },
    }
}

fn render(out: &mut String, kind: &Conversion, entry: &LogEntry) -> fmt::Result {
    let location = entry.location.as_ref();
    match kind {
        Conversion::Level => out.push_str(entry.level.to_str()),
        Conversion::Logger(precision) => {
            let name = if entry.logger_name.is_empty() {
                ROOT_LOGGER_NAME
            } else {
                entry.logger_name.as_str()
            };
            match precision {
                Some(n) => {
                    let start = name
                        .rmatch_indices('.')
                        .nth(n - 1)
                        .map_or(0, |(i, _)| i + 1);
                    out.push_str(&name[start..]);
                }
                None => out.push_str(name),
            }
        }
        Conversion::ModulePath => out.push_str(location.map_or("?", |l| l.module_path.as_ref())),
        Conversion::Method => {
            out.push_str(location.and_then(|l| l.function_name()).unwrap_or("?"))
        }
        Conversion::File => out.push_str(location.map_or("?", |l| l.file.as_ref())),
        Conversion::Line => match location {
            Some(l) => write!(out, "{}", l.line)?,
            None => out.push('?'),
        },
        Conversion::Location => match location {
            Some(l) => write!(out, "{}({})", l.file, l.line)?,
            None => out.push('?'),
        },
        Conversion::Message => out.push_str(&entry.message),
        Conversion::Mdc(Some(key)) => {
            if let Some((_, value)) = entry.mdc.iter().find(|(k, _)| k == key) {
                out.push_str(value);
            }
        }
        Conversion::Mdc(None) => {
            out.push('{');
            for (key, value) in &entry.mdc {
                write!(out, "{{{},{}}}", key, value)?;
            }
            out.push('}');
        }
        Conversion::Ndc => out.push_str(EMPTY_NDC),
        Conversion::Thread => out.push_str(entry.thread_label()),
        Conversion::Relative => write!(out, "{}", entry.relative_millis())?,
        Conversion::Date(format) => out.push_str(&format.format(&entry.timestamp)),
    }
    Ok(())
}

/// Layout attached to an appender
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    /// `LEVEL - message`
    Simple,
    Pattern(PatternLayout),
}

impl Layout {
    /// Parse `pattern` into a pattern layout.
    pub fn pattern(pattern: &str) -> Result<Self> {
        PatternLayout::parse(pattern).map(Layout::Pattern)
    }

    #[must_use]
    pub fn format(&self, entry: &LogEntry) -> String {
        match self {
            Layout::Simple => format!("{} - {}\n", entry.level.to_str(), entry.message),
            Layout::Pattern(pattern) => pattern.format(entry),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Pattern(PatternLayout::default())
    }
}
