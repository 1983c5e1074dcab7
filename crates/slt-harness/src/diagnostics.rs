//! Plain-text failure reports.
//!
//! Reports are assembled into a `String` and returned inside the outcome;
//! nothing here writes to a terminal.

use std::fmt::Write as _;

use slt_types::{LogicalType, QueryResult};

/// Width of the `=` rule between report sections.
pub const LINE_SEP_WIDTH: usize = 80;

/// Builder for one report, bound to a step's location and SQL.
#[derive(Debug, Clone)]
pub struct Report<'a> {
    out: String,
    location: &'a str,
    sql: &'a str,
}

impl<'a> Report<'a> {
    pub const fn new(location: &'a str, sql: &'a str) -> Self {
        Self {
            out: String::new(),
            location,
            sql,
        }
    }

    #[must_use]
    pub fn line_sep(mut self) -> Self {
        self.out.push_str(&"=".repeat(LINE_SEP_WIDTH));
        self.out.push('\n');
        self
    }

    /// `<description> (<file:line>)!` preceded by a rule.
    #[must_use]
    pub fn error_header(self, description: &str) -> Self {
        let mut this = self.line_sep();
        let _ = writeln!(this.out, "{description} ({})!", this.location);
        this
    }

    #[must_use]
    pub fn header(mut self, text: &str) -> Self {
        let _ = writeln!(self.out, "{text}");
        self
    }

    #[must_use]
    pub fn line(self, text: impl AsRef<str>) -> Self {
        self.header(text.as_ref())
    }

    #[must_use]
    pub fn sql(mut self) -> Self {
        let _ = writeln!(self.out, "SQL Query\n{}", self.sql);
        self
    }

    /// Rule, SQL, rule.
    #[must_use]
    pub fn sql_block(self) -> Self {
        self.line_sep().sql().line_sep()
    }

    /// Expected tokens in their resolved layout.
    #[must_use]
    pub fn expected_values(mut self, values: &[String], columns: usize, row_wise: bool) -> Self {
        self.out.push_str(&render_values(values, columns, row_wise));
        self
    }

    #[must_use]
    pub fn result(mut self, result: &QueryResult) -> Self {
        self.out.push_str(&result.render());
        self
    }

    /// Expected dump followed by the actual result.
    #[must_use]
    pub fn expected_vs_result(
        self,
        expected: &[String],
        columns: usize,
        row_wise: bool,
        actual: &QueryResult,
    ) -> Self {
        self.header("Expected result:")
            .line_sep()
            .expected_values(expected, columns, row_wise)
            .line_sep()
            .header("Actual result:")
            .line_sep()
            .result(actual)
    }

    /// Expected dump followed by the serialized actual values.
    #[must_use]
    pub fn expected_vs_values(
        self,
        expected: &[String],
        columns: usize,
        row_wise: bool,
        actual: &[String],
    ) -> Self {
        self.header("Expected result:")
            .line_sep()
            .expected_values(expected, columns, row_wise)
            .line_sep()
            .header("Actual result:")
            .line_sep()
            .expected_values(actual, columns, false)
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// One line per token when row-wise, otherwise regroup `columns` tokens per
/// tab-joined line.
pub fn render_values(values: &[String], columns: usize, row_wise: bool) -> String {
    let mut out = String::new();
    if row_wise || columns == 0 {
        for value in values {
            let _ = writeln!(out, "{value}");
        }
        return out;
    }
    for row in values.chunks(columns) {
        out.push_str(&row.join("\t"));
        // A short trailing row is printed without its newline.
        if row.len() == columns {
            out.push('\n');
        }
    }
    out
}

/// Header that would make the declared columns agree with the result.
pub fn suggested_header(types: &[LogicalType]) -> String {
    let markers: String = types.iter().map(|ty| ty.header_marker()).collect();
    format!("query {markers}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn render_row_and_column_wise() {
        assert_eq!(render_values(&strings(&["1\ta", "2\tb"]), 2, true), "1\ta\n2\tb\n");
        assert_eq!(render_values(&strings(&["1", "a", "2", "b"]), 2, false), "1\ta\n2\tb\n");
        assert_eq!(render_values(&strings(&["1", "a", "2"]), 2, false), "1\ta\n2");
    }

    #[test]
    fn report_layout() {
        let report = Report::new("t.test:7", "SELECT 1")
            .error_header("Wrong row count in query!")
            .line("Expected 2 rows, but got 1 rows")
            .sql_block()
            .finish();
        let rule = "=".repeat(80);
        assert_eq!(
            report,
            format!(
                "{rule}\nWrong row count in query! (t.test:7)!\nExpected 2 rows, but got 1 rows\n\
                 {rule}\nSQL Query\nSELECT 1\n{rule}\n"
            )
        );
    }

    #[test]
    fn suggested_header_uses_column_markers() {
        assert_eq!(
            suggested_header(&[LogicalType::Integer, LogicalType::BigInt]),
            "query II"
        );
        assert_eq!(
            suggested_header(&[
                LogicalType::Integer,
                LogicalType::Double,
                LogicalType::Varchar
            ]),
            "query IRT"
        );
    }
}
