//! Structured verdict of one verification step.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Match,
    /// The query failed and was expected to succeed.
    ExecutionFailure,
    /// The query failed for an environment reason; the file stops here.
    Skipped,
    /// The expectation itself is broken.
    TestDefinitionError,
    RowCountMismatch,
    /// The declared column count differs from the actual one. Passes when
    /// every value still matched.
    ColumnCountMismatch,
    ValueMismatch,
    HashMismatch,
    /// Output hash mode: the digest was reported, nothing compared.
    HashReported,
    /// A statement succeeded or failed against expectation.
    StatementMismatch,
}

impl OutcomeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::ExecutionFailure => "execution_failure",
            Self::Skipped => "skipped",
            Self::TestDefinitionError => "test_definition_error",
            Self::RowCountMismatch => "row_count_mismatch",
            Self::ColumnCountMismatch => "column_count_mismatch",
            Self::ValueMismatch => "value_mismatch",
            Self::HashMismatch => "hash_mismatch",
            Self::HashReported => "hash_reported",
            Self::StatementMismatch => "statement_mismatch",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict plus everything needed to explain it.
///
/// `row` and `column` are zero-based; rendered diagnostics count from one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub pass: bool,
    pub kind: OutcomeKind,
    pub row: Option<usize>,
    pub column: Option<usize>,
    pub actual: Option<String>,
    pub expected: Option<String>,
    /// `N values hashing to <digest>` of the actual values, when computed.
    pub digest: Option<String>,
    /// Rendered report; empty for a silent pass.
    pub diagnostic: String,
}

impl ComparisonOutcome {
    fn new(pass: bool, kind: OutcomeKind, diagnostic: String) -> Self {
        Self {
            pass,
            kind,
            row: None,
            column: None,
            actual: None,
            expected: None,
            digest: None,
            diagnostic,
        }
    }

    pub fn matched() -> Self {
        Self::new(true, OutcomeKind::Match, String::new())
    }

    pub fn failure(kind: OutcomeKind, diagnostic: String) -> Self {
        Self::new(false, kind, diagnostic)
    }

    /// A non-failing outcome that still carries a report.
    pub fn passing(kind: OutcomeKind, diagnostic: String) -> Self {
        Self::new(true, kind, diagnostic)
    }

    #[must_use]
    pub fn at_cell(mut self, row: usize, column: usize, actual: &str, expected: &str) -> Self {
        self.row = Some(row);
        self.column = Some(column);
        self.actual = Some(actual.to_owned());
        self.expected = Some(expected.to_owned());
        self
    }

    #[must_use]
    pub fn with_digest(mut self, digest: Option<String>) -> Self {
        self.digest = digest;
        self
    }

    /// A skipped step ends processing of the enclosing test file.
    pub const fn finishes_file(&self) -> bool {
        matches!(self.kind, OutcomeKind::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors() {
        let ok = ComparisonOutcome::matched();
        assert!(ok.pass);
        assert_eq!(ok.kind, OutcomeKind::Match);
        assert!(ok.diagnostic.is_empty());

        let bad = ComparisonOutcome::failure(OutcomeKind::ValueMismatch, "x".to_owned())
            .at_cell(1, 0, "2", "3");
        assert!(!bad.pass);
        assert_eq!((bad.row, bad.column), (Some(1), Some(0)));
        assert_eq!(bad.actual.as_deref(), Some("2"));
        assert!(!bad.finishes_file());

        let skipped = ComparisonOutcome::passing(OutcomeKind::Skipped, String::new());
        assert!(skipped.finishes_file());
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&OutcomeKind::ColumnCountMismatch).unwrap();
        assert_eq!(json, "\"column_count_mismatch\"");
        assert_eq!(OutcomeKind::HashMismatch.to_string(), "hash_mismatch");

        let outcome = ComparisonOutcome::failure(OutcomeKind::HashMismatch, "d".to_owned())
            .with_digest(Some("1 values hashing to x".to_owned()));
        let back: ComparisonOutcome =
            serde_json::from_str(&serde_json::to_string(&outcome).unwrap()).unwrap();
        assert_eq!(back, outcome);
    }
}
