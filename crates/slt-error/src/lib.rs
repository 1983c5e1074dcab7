use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for result verification.
///
/// Variants fall in two groups: data-model errors raised while building or
/// reading a result set, and test-definition errors raised when the
/// expectation itself is malformed.
#[derive(Error, Debug)]
pub enum SltError {
    // === Data Model Errors ===
    /// A value does not fit the column's declared type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A row or chunk has the wrong number of columns.
    #[error("column count mismatch: expected {expected} columns, got {actual}")]
    ColumnCount { expected: usize, actual: usize },

    /// Column vectors inside one chunk disagree on their length.
    #[error("chunk column {column} has {actual} rows, expected {expected}")]
    RaggedChunk {
        column: usize,
        expected: usize,
        actual: usize,
    },

    /// Names and types of a result disagree in length.
    #[error("result has {names} column names but {types} column types")]
    SchemaShape { names: usize, types: usize },

    // === Test Definition Errors ===
    /// A `<REGEX>:` expectation failed to compile.
    #[error("failed to parse regex '{pattern}': {detail}")]
    InvalidRegex { pattern: String, detail: String },

    /// The number of expected values is not a multiple of the column count.
    #[error(
        "expected {columns} columns, but {values} values were supplied; \
         the last row does not have enough values"
    )]
    IncompleteRow { columns: usize, values: usize },

    /// A row-wise expectation split on tabs into the wrong number of fields.
    #[error("expected {expected} columns, but got {actual} columns after splitting on tab")]
    RowSplit {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// An external result file could not be read.
    #[error("could not read result file '{path}': {detail}")]
    ExternalFile { path: PathBuf, detail: String },

    /// A verifier configuration could not be parsed.
    #[error("invalid verifier configuration: {detail}")]
    Config { detail: String },
}

impl SltError {
    /// Whether this error means the test definition is broken rather than
    /// the engine under test.
    pub const fn is_test_definition_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRegex { .. }
                | Self::IncompleteRow { .. }
                | Self::RowSplit { .. }
                | Self::ExternalFile { .. }
                | Self::Config { .. }
        )
    }

    /// Human-readable hint for fixing the test file, where one exists.
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::RowSplit { .. } => {
                Some("Does the result contain tab values? In that case, place every value on a single row.")
            }
            Self::IncompleteRow { .. } => Some("Check that every expected row has a value per column."),
            Self::InvalidRegex { .. } => Some("Regex expectations use RE2-style syntax."),
            _ => None,
        }
    }
}

/// Result type alias using `SltError`.
pub type Result<T, E = SltError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_incomplete_row() {
        let err = SltError::IncompleteRow {
            columns: 3,
            values: 7,
        };
        assert_eq!(
            err.to_string(),
            "expected 3 columns, but 7 values were supplied; the last row does not have enough values"
        );
    }

    #[test]
    fn test_definition_classification() {
        assert!(
            SltError::InvalidRegex {
                pattern: "(".to_owned(),
                detail: "unclosed group".to_owned(),
            }
            .is_test_definition_error()
        );
        assert!(
            SltError::ExternalFile {
                path: PathBuf::from("x.csv"),
                detail: "missing".to_owned(),
            }
            .is_test_definition_error()
        );
        assert!(
            !SltError::TypeMismatch {
                expected: "INTEGER".to_owned(),
                actual: "VARCHAR".to_owned(),
            }
            .is_test_definition_error()
        );
        assert!(!SltError::ColumnCount { expected: 2, actual: 1 }.is_test_definition_error());
    }

    #[test]
    fn row_split_has_suggestion() {
        let err = SltError::RowSplit {
            row: 0,
            expected: 2,
            actual: 3,
        };
        assert!(err.suggestion().is_some_and(|s| s.contains("tab")));
        assert!(SltError::Config { detail: "x".to_owned() }.suggestion().is_none());
    }
}
