//! End-to-end verification of a query or statement result.
//!
//! A [`VerificationContext`] lives for one test run. It owns the
//! configuration, the label cache and the external file loader, and turns
//! every `(step, result)` pair into a [`ComparisonOutcome`]. Errors raised by
//! the components below never escape: they become outcomes too.

use std::collections::HashMap;
use std::fmt;

use slt_error::{Result, SltError};
use slt_types::QueryResult;
use tracing::{debug, error, info, warn};

use crate::compare::{CellComparison, ValueComparator};
use crate::config::VerifyConfig;
use crate::diagnostics::{Report, suggested_header};
use crate::expectation::{Expectation, QueryStep, StatementStep};
use crate::hash::digest_values;
use crate::label_cache::LabelCache;
use crate::loader::{ExternalResultLoader, PipeDelimitedReader, substitute_loop_variables};
use crate::orientation::{self, Orientation};
use crate::outcome::{ComparisonOutcome, OutcomeKind};
use crate::serialize::{FlattenedResult, flatten_result};
use crate::sort::normalize;

/// Per-run verifier state.
pub struct VerificationContext {
    config: VerifyConfig,
    comparator: ValueComparator,
    labels: LabelCache,
    loader: Box<dyn ExternalResultLoader>,
    loop_bindings: HashMap<String, String>,
}

impl fmt::Debug for VerificationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationContext")
            .field("config", &self.config)
            .field("labels", &self.labels.len())
            .field("loop_bindings", &self.loop_bindings)
            .finish_non_exhaustive()
    }
}

impl Default for VerificationContext {
    fn default() -> Self {
        Self::new(VerifyConfig::default())
    }
}

/// Literal expected tokens plus the column count they were written for.
struct LiteralExpectation {
    tokens: Vec<String>,
    declared_column_count: usize,
}

impl VerificationContext {
    pub fn new(config: VerifyConfig) -> Self {
        Self {
            comparator: ValueComparator::new(config.float_tolerance),
            config,
            labels: LabelCache::new(),
            loader: Box::new(PipeDelimitedReader),
            loop_bindings: HashMap::new(),
        }
    }

    /// Replace the reader used for `<FILE>:` expectations.
    #[must_use]
    pub fn with_loader(mut self, loader: impl ExternalResultLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub const fn config(&self) -> &VerifyConfig {
        &self.config
    }

    pub const fn labels(&self) -> &LabelCache {
        &self.labels
    }

    /// Bind a loop variable for `${name}` substitution in file paths.
    pub fn set_loop_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.loop_bindings.insert(name.into(), value.into());
    }

    pub fn clear_loop_variable(&mut self, name: &str) {
        self.loop_bindings.remove(name);
    }

    /// Check a query result against the step's expectation.
    pub fn verify(&mut self, step: &QueryStep, result: QueryResult) -> ComparisonOutcome {
        debug!(
            file = %step.file_name,
            line = step.line,
            rows = result.row_count(),
            columns = result.column_count(),
            "verifying query result"
        );
        let outcome = self.verify_inner(step, result);
        log_outcome(&step.file_name, step.line, &outcome);
        outcome
    }

    fn verify_inner(&mut self, step: &QueryStep, result: QueryResult) -> ComparisonOutcome {
        let location = step.location();
        let report = Report::new(&location, &step.sql);

        if !result.is_success() {
            return self.query_failed(report, &result);
        }

        let flat = flatten_result(&result, self.config.legacy_float_format);
        if self.config.output_result_mode {
            log_result(&result, &flat);
        }
        let row_count = flat.row_count;
        let actual = normalize(flat.values, row_count, flat.column_count, step.sort_style);

        let literal = match self.resolve_literal(step, &result) {
            Ok(literal) => literal,
            Err(err) => return definition_error(report, &err),
        };

        let total_values = actual.len() as u64;
        let label = step.effective_label();
        let compare_hash = label.is_some() || step.expectation.is_hash_based();
        let digest = (self.config.output_hash_mode
            || compare_hash
            || self.config.exceeds_hash_threshold(total_values))
        .then(|| digest_values(&actual).to_string());

        if self.config.output_hash_mode {
            let digest = digest.unwrap_or_default();
            let diagnostic = report
                .line_sep()
                .sql()
                .line_sep()
                .line(&digest)
                .line_sep()
                .finish();
            return ComparisonOutcome::passing(OutcomeKind::HashReported, diagnostic)
                .with_digest(Some(digest));
        }

        // Literal values are always compared cell by cell; past the hash
        // threshold the actual digest is only reported alongside.
        if let (Some(literal), false) = (&literal, compare_hash) {
            return self
                .literal_path(step, report, &result, row_count, &actual, literal)
                .with_digest(digest);
        }
        let digest = digest.unwrap_or_else(|| digest_values(&actual).to_string());
        self.hash_path(step, label, report, result, digest)
    }

    /// Literal tokens for `Literal` and `File` expectations.
    fn resolve_literal(
        &self,
        step: &QueryStep,
        result: &QueryResult,
    ) -> Result<Option<LiteralExpectation>> {
        match &step.expectation {
            Expectation::Literal(tokens) => Ok(Some(LiteralExpectation {
                tokens: tokens.clone(),
                declared_column_count: step.declared_column_count,
            })),
            Expectation::File(path) => {
                let path = substitute_loop_variables(path, &self.loop_bindings);
                let loaded = self.loader.load(&path, result.names())?;
                debug!(
                    path = %path.display(),
                    values = loaded.values.len(),
                    "loaded expected values from file"
                );
                Ok(Some(LiteralExpectation {
                    tokens: loaded.values,
                    declared_column_count: loaded.column_count,
                }))
            }
            Expectation::Hash(_) | Expectation::Label(_) => Ok(None),
        }
    }

    fn query_failed(&self, report: Report<'_>, result: &QueryResult) -> ComparisonOutcome {
        let message = result.error().unwrap_or_default();
        let diagnostic = report
            .error_header("Query unexpectedly failed")
            .sql_block()
            .header("Actual result:")
            .result(result)
            .finish();
        if self.config.is_skippable_error(message) {
            ComparisonOutcome::passing(OutcomeKind::Skipped, diagnostic)
        } else {
            ComparisonOutcome::failure(OutcomeKind::ExecutionFailure, diagnostic)
        }
    }

    fn hash_path(
        &mut self,
        step: &QueryStep,
        label: Option<&str>,
        report: Report<'_>,
        result: QueryResult,
        digest: String,
    ) -> ComparisonOutcome {
        let mut expected_digest: Option<String> = None;

        if let Some(label) = label {
            let lookup = self.labels.get_or_set(label, &digest, || result.clone());
            if !lookup.is_first {
                debug!(label = %label, stored = %lookup.stored_digest, "label digest found");
            }
            if !lookup.matches(&digest) {
                expected_digest = Some(lookup.stored_digest);
            }
        }

        if let Expectation::Hash(hash) = &step.expectation {
            let token = hash.to_string();
            if token != digest {
                expected_digest = Some(token);
            }
        }

        let Some(expected_digest) = expected_digest else {
            return ComparisonOutcome::matched().with_digest(Some(digest));
        };

        let snapshot = label.and_then(|label| self.labels.snapshot(label));
        let report = report
            .error_header("Wrong result hash!")
            .line(format!("Expected {expected_digest}, but got {digest}"))
            .sql_block()
            .header("Expected result:")
            .line_sep();
        let report = match snapshot {
            Some(snapshot) => report.result(snapshot),
            None => report.line("???"),
        };
        let diagnostic = report
            .header("Actual result:")
            .line_sep()
            .result(&result)
            .finish();
        let mut outcome = ComparisonOutcome::failure(OutcomeKind::HashMismatch, diagnostic)
            .with_digest(Some(digest));
        outcome.expected = Some(expected_digest);
        outcome
    }

    fn literal_path(
        &self,
        step: &QueryStep,
        report: Report<'_>,
        result: &QueryResult,
        row_count: usize,
        actual: &[String],
        literal: &LiteralExpectation,
    ) -> ComparisonOutcome {
        let tokens = &literal.tokens;
        let declared = literal.declared_column_count;
        let columns = result.column_count();
        let count_mismatch = declared != columns;

        let orientation = match orientation::resolve(tokens, declared, columns, row_count) {
            Ok(orientation) => orientation,
            Err(err) if count_mismatch => {
                let cause = capitalize(&err.to_string());
                return column_count_failure(report, declared, tokens, false, result, &cause);
            }
            Err(err) => {
                let diagnostic = report
                    .error_header("Error in test!")
                    .line_sep()
                    .line(err.to_string())
                    .finish();
                return ComparisonOutcome::failure(OutcomeKind::TestDefinitionError, diagnostic);
            }
        };

        if orientation.expected_rows != row_count {
            if count_mismatch {
                let cause = format!(
                    "Expected {} rows, but got {} rows",
                    orientation.expected_rows, row_count
                );
                return column_count_failure(
                    report,
                    declared,
                    tokens,
                    orientation.row_wise,
                    result,
                    &cause,
                );
            }
            let diagnostic = report
                .error_header("Wrong row count in query!")
                .line(format!(
                    "Expected {} rows, but got {} rows",
                    orientation.expected_rows, row_count
                ))
                .sql_block()
                .expected_vs_result(tokens, columns, orientation.row_wise, result)
                .finish();
            return ComparisonOutcome::failure(OutcomeKind::RowCountMismatch, diagnostic);
        }

        let cells = match orientation.expected_cells(tokens) {
            Ok(cells) => cells,
            Err(err) if count_mismatch => {
                let cause = capitalize(&err.to_string());
                return column_count_failure(
                    report,
                    declared,
                    tokens,
                    orientation.row_wise,
                    result,
                    &cause,
                );
            }
            Err(err) => {
                let report = report
                    .line_sep()
                    .error_header("Error in test! Column count mismatch after splitting on tab!")
                    .line(capitalize(&err.to_string()));
                let report = match err.suggestion() {
                    Some(hint) => report.line(hint),
                    None => report,
                };
                let diagnostic = report.sql_block().finish();
                return ComparisonOutcome::failure(OutcomeKind::TestDefinitionError, diagnostic);
            }
        };
        let cells = normalize(cells, orientation.expected_rows, columns, step.sort_style);

        if let Some(outcome) =
            self.compare_cells(&report, result, actual, &cells, tokens, &orientation)
        {
            return outcome;
        }

        if count_mismatch {
            let diagnostic = report
                .line_sep()
                .error_header("Wrong column count in query!")
                .line(format!(
                    "Expected {declared} columns, but got {columns} columns"
                ))
                .sql_block()
                .line("The expected result matched the query result.")
                .line(format!(
                    "Suggested fix: modify header to \"{}\"",
                    suggested_header(result.types())
                ))
                .line_sep()
                .finish();
            return ComparisonOutcome::passing(OutcomeKind::ColumnCountMismatch, diagnostic);
        }
        ComparisonOutcome::matched()
    }

    /// Compare every cell; `None` when all match.
    fn compare_cells(
        &self,
        report: &Report<'_>,
        result: &QueryResult,
        actual: &[String],
        cells: &[String],
        tokens: &[String],
        orientation: &Orientation,
    ) -> Option<ComparisonOutcome> {
        let columns = orientation.effective_column_count;
        for (index, (actual_value, expected_value)) in actual.iter().zip(cells).enumerate() {
            let (row, column) = (index / columns, index % columns);
            let column_type = result.types()[column];
            let detail = match self
                .comparator
                .compare(actual_value, expected_value, column_type)
            {
                Ok(CellComparison::Match) => continue,
                Ok(CellComparison::Mismatch { detail }) => detail,
                Err(err) => {
                    let diagnostic = report
                        .clone()
                        .error_header("Test error!")
                        .line_sep()
                        .line(capitalize(&err.to_string()))
                        .line_sep()
                        .finish();
                    return Some(
                        ComparisonOutcome::failure(OutcomeKind::TestDefinitionError, diagnostic)
                            .at_cell(row, column, actual_value, expected_value),
                    );
                }
            };
            let report = report
                .clone()
                .error_header("Wrong result in query!")
                .sql_block()
                .line(format!("Mismatch on row {}, column {}", row + 1, column + 1))
                .line(format!("{actual_value} <> {expected_value}"));
            let report = match detail {
                Some(detail) => report.line(detail),
                None => report,
            };
            let diagnostic = report
                .line_sep()
                .expected_vs_values(tokens, columns, orientation.row_wise, actual)
                .finish();
            return Some(
                ComparisonOutcome::failure(OutcomeKind::ValueMismatch, diagnostic)
                    .at_cell(row, column, actual_value, expected_value),
            );
        }
        None
    }

    /// Check a statement result against `statement ok` / `statement error`.
    ///
    /// An internal error never satisfies `statement error`.
    pub fn check_statement(&self, step: &StatementStep, result: &QueryResult) -> ComparisonOutcome {
        if self.config.output_result_mode {
            info!(result = %result.render(), "statement result");
        }
        let message = result.error().unwrap_or_default();
        let mut expect_ok = step.expect_ok;
        let mut mismatch = !result.is_success();
        if !expect_ok {
            if self.config.is_internal_error(message) {
                expect_ok = true;
            } else {
                mismatch = !mismatch;
            }
        }

        let outcome = if mismatch {
            let location = step.location();
            let header = if expect_ok {
                "Query unexpectedly failed!"
            } else {
                "Query unexpectedly succeeded!"
            };
            let diagnostic = Report::new(&location, &step.sql)
                .error_header(header)
                .sql_block()
                .result(result)
                .finish();
            if expect_ok && self.config.is_skippable_error(message) {
                ComparisonOutcome::passing(OutcomeKind::Skipped, diagnostic)
            } else {
                ComparisonOutcome::failure(OutcomeKind::StatementMismatch, diagnostic)
            }
        } else {
            ComparisonOutcome::matched()
        };
        log_outcome(&step.file_name, step.line, &outcome);
        outcome
    }
}

fn definition_error(report: Report<'_>, err: &SltError) -> ComparisonOutcome {
    let report = report.error_header("Error in test!").line_sep().line(err.to_string());
    let report = match err.suggestion() {
        Some(hint) => report.line(hint),
        None => report,
    };
    ComparisonOutcome::failure(OutcomeKind::TestDefinitionError, report.finish())
}

/// Declared column count was wrong and the layout could not absorb it.
fn column_count_failure(
    report: Report<'_>,
    declared: usize,
    tokens: &[String],
    row_wise: bool,
    result: &QueryResult,
    cause: &str,
) -> ComparisonOutcome {
    let columns = result.column_count();
    let diagnostic = report
        .error_header("Wrong column count in query!")
        .line(format!("Expected {declared} columns, but got {columns} columns"))
        .line(format!(
            "Suggested fix: modify header to \"{}\"",
            suggested_header(result.types())
        ))
        .sql_block()
        .expected_vs_result(tokens, declared, row_wise, result)
        .line_sep()
        .line(cause)
        .finish();
    ComparisonOutcome::failure(OutcomeKind::ColumnCountMismatch, diagnostic)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Names, types and serialized rows, tab-separated.
fn log_result(result: &QueryResult, flat: &FlattenedResult) {
    let types: Vec<String> = result.types().iter().map(ToString::to_string).collect();
    let mut rows = String::new();
    for row in 0..flat.row_count {
        rows.push_str(&flat.row(row).join("\t"));
        rows.push('\n');
    }
    info!(
        names = %result.names().join("\t"),
        types = %types.join("\t"),
        rows = %rows,
        "query result"
    );
}

fn log_outcome(file: &str, line: usize, outcome: &ComparisonOutcome) {
    match (outcome.pass, outcome.kind) {
        (true, OutcomeKind::Match) => {
            debug!(file, line, kind = %outcome.kind, "result matched");
        }
        (true, OutcomeKind::HashReported) => {
            info!(
                file,
                line,
                kind = %outcome.kind,
                digest = outcome.digest.as_deref().unwrap_or_default(),
                "result hash"
            );
        }
        (true, _) => {
            warn!(
                file,
                line,
                kind = %outcome.kind,
                diagnostic = %outcome.diagnostic,
                "verification passed with warning"
            );
        }
        (false, _) => {
            error!(
                file,
                line,
                kind = %outcome.kind,
                diagnostic = %outcome.diagnostic,
                "verification failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use slt_types::{LogicalType, Value};

    use crate::expectation::SortStyle;

    fn int_result(values: &[i32]) -> QueryResult {
        let mut builder =
            QueryResult::builder(vec!["i".to_owned()], vec![LogicalType::Integer]).unwrap();
        for v in values {
            builder.push_row(vec![Value::Integer(*v)]).unwrap();
        }
        builder.finish()
    }

    fn literal(sql: &str, columns: usize, tokens: &[&str]) -> QueryStep {
        let tokens = tokens.iter().map(|s| (*s).to_owned()).collect();
        QueryStep::from_lines(sql, columns, tokens, None).at("unit.test", 1)
    }

    #[test]
    fn literal_match_and_row_count() {
        let mut ctx = VerificationContext::default();
        let outcome = ctx.verify(&literal("SELECT", 1, &["1", "2"]), int_result(&[1, 2]));
        assert!(outcome.pass, "{}", outcome.diagnostic);
        assert_eq!(outcome.kind, OutcomeKind::Match);

        let outcome = ctx.verify(&literal("SELECT", 1, &["1", "2", "3"]), int_result(&[1, 2]));
        assert_eq!(outcome.kind, OutcomeKind::RowCountMismatch);
        assert!(outcome.diagnostic.contains("Expected 3 rows, but got 2 rows"));
        assert!(outcome.diagnostic.contains("unit.test:1"));
    }

    #[test]
    fn value_mismatch_reports_one_based_coordinates() {
        let mut ctx = VerificationContext::default();
        let outcome = ctx.verify(&literal("SELECT", 1, &["1", "5"]), int_result(&[1, 2]));
        assert!(!outcome.pass);
        assert_eq!(outcome.kind, OutcomeKind::ValueMismatch);
        assert_eq!((outcome.row, outcome.column), (Some(1), Some(0)));
        assert!(outcome.diagnostic.contains("Mismatch on row 2, column 1"));
        assert!(outcome.diagnostic.contains("2 <> 5"));
    }

    #[test]
    fn incomplete_row_is_a_definition_error() {
        let mut builder = QueryResult::builder(
            vec!["a".to_owned(), "b".to_owned()],
            vec![LogicalType::Integer, LogicalType::Integer],
        )
        .unwrap();
        builder.push_row(vec![Value::Integer(1), Value::Integer(2)]).unwrap();
        let mut ctx = VerificationContext::default();
        let outcome = ctx.verify(&literal("SELECT", 2, &["1", "2", "3"]), builder.finish());
        assert_eq!(outcome.kind, OutcomeKind::TestDefinitionError);
        assert!(outcome.diagnostic.contains("Error in test!"));
    }

    #[test]
    fn output_hash_mode_reports_without_comparing() {
        let mut ctx = VerificationContext::new(VerifyConfig {
            output_hash_mode: true,
            ..VerifyConfig::default()
        });
        let step = literal("SELECT", 1, &["999"]).sorted(SortStyle::Value);
        let outcome = ctx.verify(&step, int_result(&[2, 1]));
        assert!(outcome.pass);
        assert_eq!(outcome.kind, OutcomeKind::HashReported);
        assert_eq!(
            outcome.digest.as_deref(),
            Some("2 values hashing to 6ddb4095eb719e2a9f0a3f95677d24e0")
        );
    }

    #[test]
    fn failed_query_and_skip_patterns() {
        let mut ctx = VerificationContext::default();
        let outcome = ctx.verify(&literal("SELECT", 1, &[]), QueryResult::failed("Catalog Error"));
        assert_eq!(outcome.kind, OutcomeKind::ExecutionFailure);
        assert!(!outcome.finishes_file());

        let outcome = ctx.verify(
            &literal("SELECT", 1, &[]),
            QueryResult::failed("HTTP Error: 404"),
        );
        assert!(outcome.pass);
        assert!(outcome.finishes_file());
    }

    #[test]
    fn threshold_still_compares_cells() {
        let mut ctx = VerificationContext::new(VerifyConfig {
            hash_threshold: 1,
            ..VerifyConfig::default()
        });
        let step = literal("SELECT", 1, &["1", "<REGEX>:[0-9]"]);
        let outcome = ctx.verify(&step, int_result(&[1, 2]));
        assert!(outcome.pass, "{}", outcome.diagnostic);
        assert_eq!(
            outcome.digest.as_deref(),
            Some("2 values hashing to 6ddb4095eb719e2a9f0a3f95677d24e0")
        );
        assert!(ctx.labels().is_empty());
    }

    #[test]
    fn label_expectation_routes_through_label_cache() {
        let mut ctx = VerificationContext::default();
        let step = QueryStep::new("SELECT", 1, Expectation::Label("q1".to_owned()));
        assert!(ctx.verify(&step, int_result(&[1, 2])).pass);
        assert!(ctx.labels().snapshot("q1").is_some());

        let outcome = ctx.verify(&step, int_result(&[2, 1]));
        assert_eq!(outcome.kind, OutcomeKind::HashMismatch);
        assert!(
            outcome
                .expected
                .as_deref()
                .is_some_and(|d| d.ends_with("6ddb4095eb719e2a9f0a3f95677d24e0"))
        );
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("expected 2"), "Expected 2");
        assert_eq!(capitalize(""), "");
    }
}
