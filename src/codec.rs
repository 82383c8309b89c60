//! Semicolon delimited text streams.
//!
//! ```text
//! nodes:  archetype;count;wins
//! edges:  source;target;count;wins
//! stats:  source;target;count;wins;countSource;countTarget;expectedCount
//! ```
//!
//! Readers are lenient about the framing other tools add: a tab is treated
//! like a `;`, fields are trimmed, and extra trailing fields are ignored.
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum FormatError {
    #[error("Expected at least {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Field `{field}` is empty")]
    EmptyField { field: &'static str },

    #[error("Field `{field}` is not a non negative integer: {value:?}")]
    NotAnInteger { field: &'static str, value: String },

    #[error("Field `{field}` is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },
}

/// Split a line into at least `expected` trimmed fields.
pub(crate) fn split_fields(line: &str, expected: usize) -> Result<Vec<String>, FormatError> {
    let fields: Vec<String> = line
        .trim()
        .replace('\t', ";")
        .split(';')
        .map(|f| f.trim().to_string())
        .collect();
    if fields.len() < expected {
        return Err(FormatError::FieldCount {
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

pub(crate) fn non_empty<'a>(value: &'a str, field: &'static str) -> Result<&'a str, FormatError> {
    if value.is_empty() {
        Err(FormatError::EmptyField { field })
    } else {
        Ok(value)
    }
}

pub(crate) fn parse_u64(value: &str, field: &'static str) -> Result<u64, FormatError> {
    value.parse().map_err(|_| FormatError::NotAnInteger {
        field,
        value: value.to_string(),
    })
}

pub(crate) fn parse_f64(value: &str, field: &'static str) -> Result<f64, FormatError> {
    value.parse().map_err(|_| FormatError::NotANumber {
        field,
        value: value.to_string(),
    })
}

/// Render `value` with exactly two decimals, rounding half up on its
/// shortest decimal form. `0.125` gives `0.13` where `{:.2}` gives `0.12`.
pub(crate) fn format_two_decimals(value: f64) -> String {
    if !value.is_finite() {
        return format!("{:.2}", value);
    }
    let text = value.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(2))
        .collect();

    if matches!(frac_part.as_bytes().get(2), Some(d) if *d >= b'5') {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, b'1');
                break;
            }
            i -= 1;
            if digits[i] == b'9' {
                digits[i] = b'0';
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - 2;
    let mut out = String::with_capacity(digits.len() + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.extend(digits[..split].iter().map(|&d| char::from(d)));
    out.push('.');
    out.extend(digits[split..].iter().map(|&d| char::from(d)));
    out
}

/// `value` as it reads back after [`format_two_decimals`].
pub(crate) fn round_two_decimals(value: f64) -> f64 {
    format_two_decimals(value).parse().unwrap_or(value)
}
