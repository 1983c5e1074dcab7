//! Canonical text form of result cells, and row-major flattening.

use slt_types::{LogicalType, QueryResult, Value};

pub const NULL_TEXT: &str = "NULL";
/// Stand-in for an empty string, so blank cells stay visible in dumps.
pub const EMPTY_TEXT: &str = "(empty)";

/// Convert one typed cell to its canonical display string.
///
/// With `legacy_float_format`, fractional numeric columns print as the
/// value truncated to a 64-bit integer. Booleans print as `1`/`0`.
pub fn serialize_value(value: &Value, logical_type: LogicalType, legacy_float_format: bool) -> String {
    if value.is_null() {
        return NULL_TEXT.to_owned();
    }
    if legacy_float_format && logical_type.has_fraction() {
        if let Some(truncated) = value.to_bigint_truncating() {
            return truncated.to_string();
        }
    }
    if let Value::Boolean(b) = value {
        return if *b { "1" } else { "0" }.to_owned();
    }
    let text = value.to_string();
    if text.is_empty() {
        EMPTY_TEXT.to_owned()
    } else {
        text
    }
}

/// Serialized values of a result in row-major order.
///
/// `values.len() == row_count * column_count`; the column index varies
/// fastest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedResult {
    pub values: Vec<String>,
    pub row_count: usize,
    pub column_count: usize,
}

impl FlattenedResult {
    pub fn total_value_count(&self) -> usize {
        self.values.len()
    }

    /// Values of one row.
    pub fn row(&self, row: usize) -> &[String] {
        let start = row * self.column_count;
        &self.values[start..start + self.column_count]
    }
}

/// Walk chunks in storage order, rows within a chunk, then columns.
///
/// The caller must check `result.is_success()` first; a failed result has
/// no rows and flattens to nothing.
pub fn flatten_result(result: &QueryResult, legacy_float_format: bool) -> FlattenedResult {
    debug_assert!(result.is_success(), "flatten_result called on a failed result");
    let column_count = result.column_count();
    let row_count = result.row_count();
    let mut values = Vec::with_capacity(row_count * column_count);
    for chunk in result.chunks() {
        for row in 0..chunk.size() {
            for (column, &logical_type) in result.types().iter().enumerate() {
                let value = chunk.value(column, row);
                values.push(serialize_value(&value, logical_type, legacy_float_format));
            }
        }
    }
    FlattenedResult {
        values,
        row_count,
        column_count,
    }
}
