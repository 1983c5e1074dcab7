//! Cell-level comparison of an actual value against an expected token.

use regex::RegexBuilder;
use slt_error::{Result, SltError};
use slt_types::{LogicalType, Value};

use crate::serialize::NULL_TEXT;

/// Expected value is a pattern the actual value must fully match.
pub const REGEX_PREFIX: &str = "<REGEX>:";
/// Expected value is a pattern the actual value must not fully match.
pub const NOT_REGEX_PREFIX: &str = "<!REGEX>:";

/// How a column's values are compared once exact string equality fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonCategory {
    /// Parse both sides as the column type and compare values.
    Numeric,
    /// Normalize `true`/`1` and `false`/`0`, case-insensitively.
    Boolean,
    /// Only exact or regex matches are accepted.
    Text,
}

impl ComparisonCategory {
    pub const fn of(logical_type: LogicalType) -> Self {
        if logical_type.is_numeric() {
            Self::Numeric
        } else if matches!(logical_type, LogicalType::Boolean) {
            Self::Boolean
        } else {
            Self::Text
        }
    }
}

/// Result of parsing a token under a comparison category.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    Parsed(Value),
    Unparseable,
}

impl ParsedValue {
    pub fn parse(text: &str, logical_type: LogicalType) -> Self {
        match ComparisonCategory::of(logical_type) {
            ComparisonCategory::Numeric => {
                Value::try_parse(text, logical_type).map_or(Self::Unparseable, Self::Parsed)
            }
            ComparisonCategory::Boolean => parse_boolean_token(text),
            ComparisonCategory::Text => Self::Unparseable,
        }
    }
}

fn parse_boolean_token(text: &str) -> ParsedValue {
    if text == NULL_TEXT {
        return ParsedValue::Parsed(Value::Null);
    }
    if text == "1" || text.eq_ignore_ascii_case("true") {
        ParsedValue::Parsed(Value::Boolean(true))
    } else if text == "0" || text.eq_ignore_ascii_case("false") {
        ParsedValue::Parsed(Value::Boolean(false))
    } else {
        ParsedValue::Unparseable
    }
}

/// Verdict for one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellComparison {
    Match,
    /// The values differ; `detail` explains a parse failure if there was one.
    Mismatch { detail: Option<String> },
}

impl CellComparison {
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }

    const fn mismatch() -> Self {
        Self::Mismatch { detail: None }
    }
}

/// Type-aware comparison of serialized values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueComparator {
    float_tolerance: f64,
}

impl ValueComparator {
    pub const fn new(float_tolerance: f64) -> Self {
        Self { float_tolerance }
    }

    /// Compare `actual` against `expected` for a column of `column_type`.
    ///
    /// Exact equality always matches. A regex token is decided by the regex
    /// alone. Otherwise numeric columns compare parsed values, boolean
    /// columns compare normalized truth values, and everything else is a
    /// mismatch.
    ///
    /// # Errors
    ///
    /// Returns `SltError::InvalidRegex` if a regex token does not compile.
    pub fn compare(
        &self,
        actual: &str,
        expected: &str,
        column_type: LogicalType,
    ) -> Result<CellComparison> {
        if actual == expected {
            return Ok(CellComparison::Match);
        }
        if let Some((pattern, want_match)) = regex_token(expected) {
            let matched = full_match(pattern, actual)?;
            return Ok(if matched == want_match {
                CellComparison::Match
            } else {
                CellComparison::mismatch()
            });
        }
        let category = ComparisonCategory::of(column_type);
        if category == ComparisonCategory::Text {
            return Ok(CellComparison::mismatch());
        }
        let actual_value = match ParsedValue::parse(actual, column_type) {
            ParsedValue::Parsed(value) => value,
            ParsedValue::Unparseable => return Ok(cannot_convert(actual, column_type)),
        };
        let expected_value = match ParsedValue::parse(expected, column_type) {
            ParsedValue::Parsed(value) => value,
            ParsedValue::Unparseable => return Ok(cannot_convert(expected, column_type)),
        };
        if actual_value.values_equal(&expected_value, self.float_tolerance) {
            Ok(CellComparison::Match)
        } else {
            Ok(CellComparison::mismatch())
        }
    }
}

fn cannot_convert(text: &str, column_type: LogicalType) -> CellComparison {
    CellComparison::Mismatch {
        detail: Some(format!("Cannot convert value {text} to type {column_type}")),
    }
}

/// Split a regex token into its pattern and whether a match is wanted.
fn regex_token(expected: &str) -> Option<(&str, bool)> {
    expected
        .strip_prefix(REGEX_PREFIX)
        .map(|pattern| (pattern, true))
        .or_else(|| {
            expected
                .strip_prefix(NOT_REGEX_PREFIX)
                .map(|pattern| (pattern, false))
        })
}

fn full_match(pattern: &str, actual: &str) -> Result<bool> {
    let regex = RegexBuilder::new(&format!(r"\A(?:{pattern})\z"))
        .dot_matches_new_line(true)
        .build()
        .map_err(|err| SltError::InvalidRegex {
            pattern: pattern.to_owned(),
            detail: err.to_string(),
        })?;
    Ok(regex.is_match(actual))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact() -> ValueComparator {
        ValueComparator::new(0.0)
    }

    fn matches(actual: &str, expected: &str, ty: LogicalType) -> bool {
        exact()
            .compare(actual, expected, ty)
            .expect("no test-definition error")
            .is_match()
    }

    #[test]
    fn exact_string_equality_wins() {
        assert!(matches("abc", "abc", LogicalType::Varchar));
        assert!(matches("not a number", "not a number", LogicalType::Integer));
        assert!(!matches("abc", "abd", LogicalType::Varchar));
    }

    #[test]
    fn numeric_equality_absorbs_formatting() {
        assert!(matches("1.50000", "1.5", LogicalType::Float));
        assert!(matches("1", "1.0", LogicalType::Double));
        assert!(matches("1", "1.0", LogicalType::Integer));
        assert!(matches("NULL", "NULL", LogicalType::BigInt));
        assert!(!matches("NULL", "0", LogicalType::BigInt));
        assert!(!matches("2", "3", LogicalType::Integer));
        let decimal = LogicalType::Decimal {
            width: 9,
            scale: 2,
        };
        assert!(matches("1.50", "1.5", decimal));
    }

    #[test]
    fn unparseable_numeric_is_a_mismatch_with_detail() {
        let verdict = exact()
            .compare("12", "twelve", LogicalType::Integer)
            .expect("not a definition error");
        assert_eq!(
            verdict,
            CellComparison::Mismatch {
                detail: Some("Cannot convert value twelve to type INTEGER".to_owned())
            }
        );
    }

    #[test]
    fn float_tolerance_applies_to_reals_only() {
        let loose = ValueComparator::new(1e-6);
        assert!(loose.compare("1.0000001", "1", LogicalType::Double).unwrap().is_match());
        assert!(!exact().compare("1.0000001", "1", LogicalType::Double).unwrap().is_match());
    }

    #[test]
    fn booleans_normalize_each_side() {
        assert!(matches("1", "true", LogicalType::Boolean));
        assert!(matches("0", "FALSE", LogicalType::Boolean));
        assert!(matches("True", "1", LogicalType::Boolean));
        assert!(!matches("1", "false", LogicalType::Boolean));
        assert!(!matches("1", "yes", LogicalType::Boolean));
    }

    #[test]
    fn text_requires_exact_match() {
        assert!(!matches("1.0", "1", LogicalType::Varchar));
        assert!(!matches("2020-01-01", "2020-1-1", LogicalType::Date));
    }

    #[test]
    fn regex_is_a_full_match() {
        assert!(matches("abcz", "<REGEX>:^a.*z$", LogicalType::Varchar));
        assert!(!matches("abc", "<REGEX>:^a.*z$", LogicalType::Varchar));
        assert!(!matches("xabc", "<REGEX>:abc", LogicalType::Varchar));
        assert!(matches("a\nb", "<REGEX>:a.b", LogicalType::Varchar));
        assert!(matches("abc", "<!REGEX>:x.*", LogicalType::Varchar));
        assert!(!matches("xyz", "<!REGEX>:x.*", LogicalType::Varchar));
    }

    #[test]
    fn regex_does_not_fall_back_to_numeric() {
        assert!(!matches("1", "<REGEX>:2", LogicalType::Integer));
    }

    #[test]
    fn invalid_regex_is_a_definition_error() {
        let err = exact()
            .compare("abc", "<REGEX>:(unclosed", LogicalType::Varchar)
            .expect_err("bad pattern");
        assert!(matches!(err, SltError::InvalidRegex { ref pattern, .. } if pattern == "(unclosed"));
        assert!(err.is_test_definition_error());
    }

    #[test]
    fn categories() {
        assert_eq!(ComparisonCategory::of(LogicalType::HugeInt), ComparisonCategory::Numeric);
        assert_eq!(ComparisonCategory::of(LogicalType::Boolean), ComparisonCategory::Boolean);
        assert_eq!(ComparisonCategory::of(LogicalType::Blob), ComparisonCategory::Text);
        assert_eq!(
            ParsedValue::parse("x", LogicalType::Double),
            ParsedValue::Unparseable
        );
    }
}
