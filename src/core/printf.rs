//! printf-style message formatting
//!
//! Sequential positional substitution of `FieldValue` arguments into a
//! C-style format string, as used by the `*f!` macros and `Logger::logf`.
//!
//! Supported directives: `%[flags][width][.precision][length]conversion`
//! with flags `-`, `+`, space, `0`, `#`, conversions `d i u f F e E g G s c x X o`
//! and `%%`. Length modifiers are accepted and ignored.
//!
//! Formatting never fails: a directive without a matching argument is copied
//! verbatim, surplus arguments are ignored and mismatched types are coerced.

use super::mdc::FieldValue;

#[derive(Debug, Default, Clone, Copy)]
struct Spec {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alt: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

/// Format `fmt` with `args`.
///
/// ```
/// use rust_hierarchical_logger::core::printf::sprintf;
///
/// let text = sprintf("Format %d %g %s", &[3.into(), 2.71828.into(), "foo".into()]);
/// assert_eq!(text, "Format 3 2.71828 foo");
/// ```
pub fn sprintf(fmt: &str, args: &[FieldValue]) -> String {
    let mut out = String::with_capacity(fmt.len() + args.len() * 8);
    let mut args = args.iter();
    let mut rest = fmt;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let directive = &rest[pos..];
        match parse_directive(directive) {
            Some((spec, conversion, consumed)) => {
                if conversion == '%' {
                    out.push('%');
                } else {
                    match args.next() {
                        Some(arg) => render(&mut out, spec, conversion, arg),
                        None => out.push_str(&directive[..consumed]),
                    }
                }
                rest = &directive[consumed..];
            }
            None => {
                // dangling or unknown directive, keep the text as-is
                out.push('%');
                rest = &directive[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse a directive starting at `%`; returns spec, conversion and byte length.
fn parse_directive(s: &str) -> Option<(Spec, char, usize)> {
    let bytes = s.as_bytes();
    let mut i = 1;
    let mut spec = Spec::default();

    while i < bytes.len() {
        match bytes[i] {
            b'-' => spec.left = true,
            b'+' => spec.plus = true,
            b' ' => spec.space = true,
            b'0' => spec.zero = true,
            b'#' => spec.alt = true,
            _ => break,
        }
        i += 1;
    }

    let start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i > start {
        spec.width = s[start..i].parse().ok();
    }

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        spec.precision = Some(s[start..i].parse().unwrap_or(0));
    }

    while i < bytes.len() && matches!(bytes[i], b'h' | b'l' | b'L' | b'q' | b'j' | b'z' | b't') {
        i += 1;
    }

    let conversion = *bytes.get(i)? as char;
    match conversion {
        'd' | 'i' | 'u' | 'f' | 'F' | 'e' | 'E' | 'g' | 'G' | 's' | 'c' | 'x' | 'X' | 'o' | '%' => {
            Some((spec, conversion, i + 1))
        }
        _ => None,
    }
}

fn render(out: &mut String, spec: Spec, conversion: char, arg: &FieldValue) {
    match conversion {
        'd' | 'i' | 'u' => match arg.as_i64() {
            Some(v) => {
                let digits = v.unsigned_abs().to_string();
                let digits = min_digits(digits, spec.precision);
                pad_numeric(out, spec, v < 0, &digits, "");
            }
            None => pad_text(out, spec, &arg.to_string()),
        },
        'x' | 'X' | 'o' => match arg.as_i64() {
            Some(v) => {
                let (digits, prefix) = match conversion {
                    'x' => (format!("{:x}", v), "0x"),
                    'X' => (format!("{:X}", v), "0X"),
                    _ => (format!("{:o}", v), "0"),
                };
                let digits = min_digits(digits, spec.precision);
                let prefix = if spec.alt && v != 0 { prefix } else { "" };
                pad_numeric(out, Spec { plus: false, space: false, ..spec }, false, &digits, prefix);
            }
            None => pad_text(out, spec, &arg.to_string()),
        },
        'f' | 'F' | 'e' | 'E' | 'g' | 'G' => match arg.as_f64() {
            Some(v) if v.is_finite() => {
                let precision = spec.precision.unwrap_or(6);
                let body = match conversion {
                    'f' | 'F' => format!("{:.*}", precision, v.abs()),
                    'e' => exponential(v.abs(), precision, false),
                    'E' => exponential(v.abs(), precision, true),
                    _ => general(v.abs(), precision, spec.alt, conversion == 'G'),
                };
                pad_numeric(
                    out,
                    Spec { precision: None, ..spec },
                    v.is_sign_negative() && v != 0.0,
                    &body,
                    "",
                );
            }
            Some(v) => {
                let text = if v.is_nan() {
                    "nan"
                } else if v.is_sign_negative() {
                    "-inf"
                } else {
                    "inf"
                };
                let text = if conversion.is_ascii_uppercase() {
                    text.to_uppercase()
                } else {
                    text.to_string()
                };
                pad_text(out, Spec { zero: false, ..spec }, &text);
            }
            None => pad_text(out, spec, &arg.to_string()),
        },
        'c' => {
            let text = match arg {
                FieldValue::Char(c) => c.to_string(),
                FieldValue::Int(_) | FieldValue::UInt(_) => arg
                    .as_i64()
                    .and_then(|v| u32::try_from(v).ok())
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_default(),
                other => other.to_string().chars().next().map(String::from).unwrap_or_default(),
            };
            pad_text(out, spec, &text);
        }
        _ => {
            let text = arg.to_string();
            let text = match spec.precision {
                Some(p) => text.chars().take(p).collect(),
                None => text,
            };
            pad_text(out, spec, &text);
        }
    }
}

fn min_digits(digits: String, precision: Option<usize>) -> String {
    match precision {
        Some(p) if digits.len() < p => format!("{}{}", "0".repeat(p - digits.len()), digits),
        _ => digits,
    }
}

/// C-style exponential notation: mantissa, `e`, sign, at least two exponent digits.
fn exponential(v: f64, precision: usize, upper: bool) -> String {
    let formatted = format!("{:.*e}", precision, v);
    let (mantissa, exp) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    let e = if upper { 'E' } else { 'e' };
    format!("{}{}{}{:02}", mantissa, e, sign, exp.abs())
}

/// `%g`: shortest of fixed/exponential at `precision` significant digits.
fn general(v: f64, precision: usize, alt: bool, upper: bool) -> String {
    let precision = precision.max(1);
    let exp = if v == 0.0 {
        0
    } else {
        let formatted = format!("{:.*e}", precision - 1, v);
        formatted
            .split_once('e')
            .and_then(|(_, e)| e.parse::<i32>().ok())
            .unwrap_or(0)
    };

    let body = if exp < -4 || exp >= precision as i32 {
        exponential(v, precision - 1, upper)
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        format!("{:.*}", decimals, v)
    };

    if alt {
        return body;
    }
    strip_trailing_zeros(&body)
}

fn strip_trailing_zeros(body: &str) -> String {
    let (number, suffix) = match body.find(['e', 'E']) {
        Some(idx) => body.split_at(idx),
        None => (body, ""),
    };
    if !number.contains('.') {
        return body.to_string();
    }
    let trimmed = number.trim_end_matches('0').trim_end_matches('.');
    format!("{}{}", trimmed, suffix)
}

fn pad_numeric(out: &mut String, spec: Spec, negative: bool, digits: &str, prefix: &str) {
    let sign = if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    };
    let len = sign.len() + prefix.len() + digits.chars().count();
    let width = spec.width.unwrap_or(0);
    if len >= width {
        out.push_str(sign);
        out.push_str(prefix);
        out.push_str(digits);
    } else if spec.left {
        out.push_str(sign);
        out.push_str(prefix);
        out.push_str(digits);
        out.push_str(&" ".repeat(width - len));
    } else if spec.zero && spec.precision.is_none() {
        out.push_str(sign);
        out.push_str(prefix);
        out.push_str(&"0".repeat(width - len));
        out.push_str(digits);
    } else {
        out.push_str(&" ".repeat(width - len));
        out.push_str(sign);
        out.push_str(prefix);
        out.push_str(digits);
    }
}

fn pad_text(out: &mut String, spec: Spec, text: &str) {
    let len = text.chars().count();
    let width = spec.width.unwrap_or(0);
    if len >= width {
        out.push_str(text);
    } else if spec.left {
        out.push_str(text);
        out.push_str(&" ".repeat(width - len));
    } else {
        out.push_str(&" ".repeat(width - len));
        out.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_conversions() {
        let a: Vec<FieldValue> = vec![3.into(), 2.71828.into(), "foo".into()];
        assert_eq!(sprintf("Format %d %g %s", &a), "Format 3 2.71828 foo");
        assert_eq!(
            sprintf("This is FATAL %d %s", &[42.into(), "logging".into()]),
            "This is FATAL 42 logging"
        );
    }

    #[test]
    fn test_percent_literal_and_no_args() {
        assert_eq!(sprintf("100%% done", &[]), "100% done");
        assert_eq!(sprintf("plain text", &[]), "plain text");
    }

    #[test]
    fn test_missing_and_extra_arguments() {
        assert_eq!(sprintf("%d and %s", &[1.into()]), "1 and %s");
        assert_eq!(sprintf("%d", &[1.into(), 2.into()]), "1");
    }

    #[test]
    fn test_unknown_directive_kept() {
        assert_eq!(sprintf("%y %d", &[5.into()]), "%y 5");
        assert_eq!(sprintf("trailing %", &[1.into()]), "trailing %");
    }

    #[test]
    fn test_width_and_flags() {
        assert_eq!(sprintf("[%5d]", &[42.into()]), "[   42]");
        assert_eq!(sprintf("[%-5d]", &[42.into()]), "[42   ]");
        assert_eq!(sprintf("[%05d]", &[(-42).into()]), "[-0042]");
        assert_eq!(sprintf("[%+d]", &[7.into()]), "[+7]");
        assert_eq!(sprintf("[%.3d]", &[7.into()]), "[007]");
        assert_eq!(sprintf("[%6s]", &["ab".into()]), "[    ab]");
        assert_eq!(sprintf("[%.2s]", &["abcdef".into()]), "[ab]");
        assert_eq!(sprintf("[%ld]", &[9_i64.into()]), "[9]");
    }

    #[test]
    fn test_float_conversions() {
        assert_eq!(sprintf("%f", &[1.5.into()]), "1.500000");
        assert_eq!(sprintf("%.2f", &[3.14159.into()]), "3.14");
        assert_eq!(sprintf("%e", &[12345.678.into()]), "1.234568e+04");
        assert_eq!(sprintf("%E", &[0.00012.into()]), "1.200000E-04");
        assert_eq!(sprintf("%g", &[0.0001.into()]), "0.0001");
        assert_eq!(sprintf("%g", &[1e-5.into()]), "1e-05");
        assert_eq!(sprintf("%g", &[123456789.0.into()]), "1.23457e+08");
        assert_eq!(sprintf("%g", &[100.0.into()]), "100");
        assert_eq!(sprintf("%g", &[0.0.into()]), "0");
        assert_eq!(sprintf("%g", &[(-2.5).into()]), "-2.5");
        assert_eq!(sprintf("%f", &[f64::NAN.into()]), "nan");
    }

    #[test]
    fn test_integer_bases_and_chars() {
        assert_eq!(sprintf("%x %X %o", &[255.into(), 255.into(), 8.into()]), "ff FF 10");
        assert_eq!(sprintf("%#x", &[255.into()]), "0xff");
        assert_eq!(sprintf("%c%c", &['o'.into(), 107.into()]), "ok");
    }

    #[test]
    fn test_type_coercion() {
        assert_eq!(sprintf("%d", &[2.9.into()]), "2");
        assert_eq!(sprintf("%f", &[2.into()]), "2.000000");
        assert_eq!(sprintf("%d", &["12".into()]), "12");
        assert_eq!(sprintf("%d", &["abc".into()]), "abc");
        assert_eq!(sprintf("%s", &[true.into()]), "true");
    }
}
