use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LogicalType;

/// A single typed, possibly-NULL cell of a result set.
///
/// The variant carries both the category and the payload, so a value never
/// needs to be re-inspected as text to learn what it is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL.
    Null,
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    HugeInt(i128),
    Float(f32),
    Double(f64),
    /// Fixed-point decimal: the real value is `value / 10^scale`.
    Decimal { value: i128, scale: u8 },
    Varchar(String),
    Blob(Vec<u8>),
    /// Days since 1970-01-01.
    Date(i32),
}

impl Value {
    /// Returns true if this is a NULL value.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert a numeric value to the widest signed integer, truncating any
    /// fractional part toward zero and saturating at the `i64` range.
    ///
    /// Returns `None` for NULL and non-numeric values.
    pub fn to_bigint_truncating(&self) -> Option<i64> {
        match self {
            Self::TinyInt(v) => Some(i64::from(*v)),
            Self::SmallInt(v) => Some(i64::from(*v)),
            Self::Integer(v) => Some(i64::from(*v)),
            Self::BigInt(v) => Some(*v),
            Self::HugeInt(v) => Some(saturate_i128(*v)),
            // `as` truncates toward zero, saturates, and maps NaN to 0.
            Self::Float(v) => Some(f64::from(*v) as i64),
            Self::Double(v) => Some(*v as i64),
            Self::Decimal { value, scale } => Some(saturate_i128(value / pow10(*scale))),
            Self::Null | Self::Boolean(_) | Self::Varchar(_) | Self::Blob(_) | Self::Date(_) => {
                None
            }
        }
    }

    /// Parse text as a value of the given type.
    ///
    /// The literal `NULL` parses to [`Value::Null`] for every type. Returns
    /// `None` when the text is not a valid literal of `ty`.
    pub fn try_parse(text: &str, ty: LogicalType) -> Option<Self> {
        if text == "NULL" {
            return Some(Self::Null);
        }
        match ty {
            LogicalType::Boolean => parse_bool(text).map(Self::Boolean),
            LogicalType::TinyInt => parse_integral(text)
                .and_then(|v| i8::try_from(v).ok())
                .map(Self::TinyInt),
            LogicalType::SmallInt => parse_integral(text)
                .and_then(|v| i16::try_from(v).ok())
                .map(Self::SmallInt),
            LogicalType::Integer => parse_integral(text)
                .and_then(|v| i32::try_from(v).ok())
                .map(Self::Integer),
            LogicalType::BigInt => parse_integral(text)
                .and_then(|v| i64::try_from(v).ok())
                .map(Self::BigInt),
            LogicalType::HugeInt => parse_integral(text).map(Self::HugeInt),
            LogicalType::Float => text.trim().parse::<f32>().ok().map(Self::Float),
            LogicalType::Double => text.trim().parse::<f64>().ok().map(Self::Double),
            LogicalType::Decimal { width, scale } => {
                parse_decimal(text, width, scale).map(|value| Self::Decimal { value, scale })
            }
            LogicalType::Varchar => Some(Self::Varchar(text.to_owned())),
            LogicalType::Blob => parse_blob(text).map(Self::Blob),
            LogicalType::Date => parse_date(text).map(Self::Date),
        }
    }

    /// Type-aware equality.
    ///
    /// NULL equals NULL. Floating-point values compare within a relative
    /// `float_tolerance` (0 means exact) and NaN equals NaN. Decimals with
    /// different scales are compared after rescaling.
    pub fn values_equal(&self, other: &Self, float_tolerance: f64) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Null, _) | (_, Self::Null) => false,
            (Self::Float(a), Self::Float(b)) => {
                floats_equal(f64::from(*a), f64::from(*b), float_tolerance)
            }
            (Self::Double(a), Self::Double(b)) => floats_equal(*a, *b, float_tolerance),
            (
                Self::Decimal {
                    value: a,
                    scale: scale_a,
                },
                Self::Decimal {
                    value: b,
                    scale: scale_b,
                },
            ) => decimals_equal(*a, *scale_a, *b, *scale_b),
            _ => self == other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            Self::TinyInt(v) => write!(f, "{v}"),
            Self::SmallInt(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::HugeInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Decimal { value, scale } => f.write_str(&format_decimal(*value, *scale)),
            Self::Varchar(s) => f.write_str(s),
            Self::Blob(bytes) => f.write_str(&format_blob(bytes)),
            Self::Date(days) => {
                let (year, month, day) = civil_from_days(i64::from(*days));
                write!(f, "{year:04}-{month:02}-{day:02}")
            }
        }
    }
}

fn pow10(exp: u8) -> i128 {
    10_i128.pow(u32::from(exp.min(LogicalType::MAX_DECIMAL_WIDTH)))
}

fn saturate_i128(v: i128) -> i64 {
    i64::try_from(v).unwrap_or(if v < 0 { i64::MIN } else { i64::MAX })
}

fn floats_equal(a: f64, b: f64, tolerance: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    if a == b {
        return true;
    }
    tolerance > 0.0 && (a - b).abs() <= tolerance * a.abs().max(b.abs())
}

fn decimals_equal(a: i128, scale_a: u8, b: i128, scale_b: u8) -> bool {
    match scale_a.cmp(&scale_b) {
        std::cmp::Ordering::Equal => a == b,
        std::cmp::Ordering::Less => a
            .checked_mul(pow10(scale_b - scale_a))
            .is_some_and(|rescaled| rescaled == b),
        std::cmp::Ordering::Greater => b
            .checked_mul(pow10(scale_a - scale_b))
            .is_some_and(|rescaled| rescaled == a),
    }
}

fn format_decimal(value: i128, scale: u8) -> String {
    if scale == 0 {
        return value.to_string();
    }
    let scale = usize::from(scale);
    let digits = value.unsigned_abs().to_string();
    let padded = if digits.len() <= scale {
        format!("{}{digits}", "0".repeat(scale + 1 - digits.len()))
    } else {
        digits
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{int_part}.{frac_part}")
}

fn format_blob(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len());
    for &byte in bytes {
        let printable =
            (byte.is_ascii_graphic() || byte == b' ') && !matches!(byte, b'\\' | b'\'' | b'"');
        if printable {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "\\x{byte:02X}");
        }
    }
    out
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

/// Integers also accept a fractional part made only of zeros (`1.0`, `-3.00`).
fn parse_integral(text: &str) -> Option<i128> {
    let text = text.trim();
    if let Ok(v) = text.parse::<i128>() {
        return Some(v);
    }
    let (int_part, frac_part) = text.split_once('.')?;
    if frac_part.is_empty() || !frac_part.bytes().all(|b| b == b'0') {
        return None;
    }
    int_part.parse::<i128>().ok()
}

/// Parse a plain decimal literal at the given scale, rounding half away from
/// zero on the first dropped digit.
fn parse_decimal(text: &str, width: u8, scale: u8) -> Option<i128> {
    let text = text.trim();
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (int_digits, frac_digits) = body.split_once('.').unwrap_or((body, ""));
    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }
    if !int_digits.bytes().all(|b| b.is_ascii_digit())
        || !frac_digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let mut mantissa: i128 = 0;
    for b in int_digits.bytes() {
        mantissa = mantissa.checked_mul(10)?.checked_add(i128::from(b - b'0'))?;
    }
    let mut frac = frac_digits.bytes();
    for _ in 0..scale {
        let digit = frac.next().map_or(0, |b| b - b'0');
        mantissa = mantissa.checked_mul(10)?.checked_add(i128::from(digit))?;
    }
    if frac.next().is_some_and(|b| b >= b'5') {
        mantissa = mantissa.checked_add(1)?;
    }
    if mantissa >= pow10(width) {
        return None;
    }
    Some(if negative { -mantissa } else { mantissa })
}

fn parse_blob(text: &str) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            let hex = text.get(i + 2..i + 4)?;
            if bytes.get(i + 1) != Some(&b'x') {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Some(out)
}

fn parse_date(text: &str) -> Option<i32> {
    let mut parts = text.trim().splitn(3, '-');
    let year: i64 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    let days = days_from_civil(year, month, day);
    // Rejects days past the end of the month (e.g. 2023-02-30).
    if civil_from_days(days) != (year, month, day) {
        return None;
    }
    i32::try_from(days).ok()
}

fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = (if year >= 0 { year } else { year - 399 }) / 400;
    let yoe = year - era * 400;
    let mp = (i64::from(month) + 9) % 12;
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    (if month <= 2 { year + 1 } else { year }, month, day)
}
