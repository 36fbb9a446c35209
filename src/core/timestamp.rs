//! Timestamp formatting utilities
//!
//! Backs the `%d` conversion of pattern layouts. Supports the log4j named
//! date formats, RFC 3339, Unix timestamps, strftime strings and the common
//! subset of Java `SimpleDateFormat` patterns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp format options for the `%d` conversion
///
/// # Examples
///
/// ```
/// use rust_hierarchical_logger::core::TimestampFormat;
/// use chrono::Utc;
///
/// let format = TimestampFormat::from_option(Some("ABSOLUTE"));
/// let rendered = format.format(&Utc::now());
/// assert_eq!(rendered.len(), "10:30:45,123".len());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// log4j ISO 8601: `2025-01-08 10:30:45,123`
    #[default]
    Iso8601,

    /// Time of day only: `10:30:45,123`
    Absolute,

    /// `08 Jan 2025 10:30:45,123`
    Date,

    /// RFC 3339 format: `2025-01-08T10:30:45.123+00:00`
    Rfc3339,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    /// Resolve the `{...}` option of a `%d` conversion.
    ///
    /// Named formats are matched case-insensitively; strings containing `%`
    /// are used as strftime formats; anything else is translated from Java
    /// `SimpleDateFormat` syntax.
    pub fn from_option(option: Option<&str>) -> Self {
        let Some(option) = option.map(str::trim).filter(|o| !o.is_empty()) else {
            return TimestampFormat::Iso8601;
        };
        match option.to_uppercase().as_str() {
            "ISO8601" => TimestampFormat::Iso8601,
            "ABSOLUTE" => TimestampFormat::Absolute,
            "DATE" => TimestampFormat::Date,
            "RFC3339" => TimestampFormat::Rfc3339,
            "UNIX" => TimestampFormat::Unix,
            "UNIX_MILLIS" => TimestampFormat::UnixMillis,
            _ if option.contains('%') => TimestampFormat::Custom(option.to_string()),
            _ => TimestampFormat::Custom(java_to_strftime(option)),
        }
    }

    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%d %H:%M:%S,%3f").to_string(),
            TimestampFormat::Absolute => datetime.format("%H:%M:%S,%3f").to_string(),
            TimestampFormat::Date => datetime.format("%d %b %Y %H:%M:%S,%3f").to_string(),
            TimestampFormat::Rfc3339 => {
                datetime.to_rfc3339_opts(chrono::SecondsFormat::Millis, false)
            }
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => {
                use std::fmt::Write;
                let mut out = String::new();
                // chrono reports invalid specifiers through fmt::Error
                if write!(out, "{}", datetime.format(format_str)).is_err() {
                    return format_str.clone();
                }
                out
            }
        }
    }
}

/// Translate the common `SimpleDateFormat` letters to strftime.
///
/// Text inside single quotes is copied literally.
fn java_to_strftime(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }
        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        let converted = match (c, run) {
            ('y', 2) => Some("%y"),
            ('y', _) => Some("%Y"),
            ('M', 1 | 2) => Some("%m"),
            ('M', 3) => Some("%b"),
            ('M', _) => Some("%B"),
            ('d', _) => Some("%d"),
            ('H', _) => Some("%H"),
            ('h', _) => Some("%I"),
            ('m', _) => Some("%M"),
            ('s', _) => Some("%S"),
            ('S', _) => Some("%3f"),
            ('E', 1..=3) => Some("%a"),
            ('E', _) => Some("%A"),
            ('a', _) => Some("%p"),
            ('Z', _) => Some("%z"),
            _ => None,
        };
        match converted {
            Some(spec) => out.push_str(spec),
            None => (0..run).for_each(|_| push_literal(&mut out, c)),
        }
        i += run;
    }
    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
