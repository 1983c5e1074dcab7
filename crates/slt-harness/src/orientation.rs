//! Row-wise versus column-wise layout of literal expectations.

use slt_error::{Result, SltError};

/// How the expected tokens line up against the actual result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    /// Column count used for comparison; always the actual column count.
    pub effective_column_count: usize,
    /// Each expected token is one tab-joined row.
    pub row_wise: bool,
    /// The declared column count disagreed with the actual one.
    pub count_mismatch: bool,
    pub expected_rows: usize,
}

/// Decide the orientation of `expected`.
///
/// The actual column count always wins over the declared one; a
/// disagreement is remembered in `count_mismatch` for a later diagnostic.
/// Tokens are row-wise when there is more than one column and one token per
/// actual row, or when every token contains a tab.
///
/// # Errors
///
/// Returns `SltError::IncompleteRow` when a column-wise expectation does not
/// divide evenly into rows.
pub fn resolve(
    expected: &[String],
    declared_column_count: usize,
    actual_column_count: usize,
    actual_row_count: usize,
) -> Result<Orientation> {
    let count_mismatch = declared_column_count != actual_column_count;
    let effective_column_count = actual_column_count;

    let mut row_wise = effective_column_count > 1 && expected.len() == actual_row_count;
    if !row_wise {
        row_wise = expected.iter().all(|token| token.contains('\t'));
    }

    let expected_rows = if row_wise {
        expected.len()
    } else if effective_column_count == 0 || expected.len() % effective_column_count != 0 {
        return Err(SltError::IncompleteRow {
            columns: effective_column_count,
            values: expected.len(),
        });
    } else {
        expected.len() / effective_column_count
    };

    Ok(Orientation {
        effective_column_count,
        row_wise,
        count_mismatch,
        expected_rows,
    })
}

impl Orientation {
    /// Split the expected tokens into cells in row-major order.
    ///
    /// # Errors
    ///
    /// Returns `SltError::RowSplit` when a row-wise token does not split on
    /// tabs into exactly `effective_column_count` fields.
    pub fn expected_cells(&self, expected: &[String]) -> Result<Vec<String>> {
        if !self.row_wise {
            return Ok(expected.to_vec());
        }
        let mut cells = Vec::with_capacity(expected.len() * self.effective_column_count);
        for (row, token) in expected.iter().enumerate() {
            let before = cells.len();
            cells.extend(token.split('\t').map(str::to_owned));
            let fields = cells.len() - before;
            if fields != self.effective_column_count {
                return Err(SltError::RowSplit {
                    row,
                    expected: self.effective_column_count,
                    actual: fields,
                });
            }
        }
        Ok(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn single_column_is_column_wise() {
        let o = resolve(&tokens(&["1", "2"]), 1, 1, 2).unwrap();
        assert!(!o.row_wise);
        assert!(!o.count_mismatch);
        assert_eq!(o.expected_rows, 2);
    }

    #[test]
    fn one_token_per_row_is_row_wise() {
        let o = resolve(&tokens(&["1\ta", "2\tb"]), 2, 2, 2).unwrap();
        assert!(o.row_wise);
        assert_eq!(o.expected_rows, 2);
        assert_eq!(
            o.expected_cells(&tokens(&["1\ta", "2\tb"])).unwrap(),
            tokens(&["1", "a", "2", "b"])
        );
    }

    #[test]
    fn column_wise_multi_column() {
        let expected = tokens(&["1", "a", "2", "b"]);
        let o = resolve(&expected, 2, 2, 2).unwrap();
        assert!(!o.row_wise);
        assert_eq!(o.expected_rows, 2);
        assert_eq!(o.expected_cells(&expected).unwrap(), expected);
    }

    #[test]
    fn all_tabs_forces_row_wise_despite_counts() {
        // Three tab rows against a two-row result: still row-wise, and the
        // row count check downstream reports 3 vs 2.
        let o = resolve(&tokens(&["1\ta", "2\tb", "3\tc"]), 2, 2, 2).unwrap();
        assert!(o.row_wise);
        assert_eq!(o.expected_rows, 3);
    }

    #[test]
    fn declared_count_is_overridden() {
        let o = resolve(&tokens(&["1", "2", "3", "4"]), 3, 2, 2).unwrap();
        assert!(o.count_mismatch);
        assert_eq!(o.effective_column_count, 2);
        assert_eq!(o.expected_rows, 2);
    }

    #[test]
    fn incomplete_last_row() {
        let err = resolve(&tokens(&["1", "2", "3"]), 2, 2, 1).expect_err("not divisible");
        assert!(matches!(
            err,
            SltError::IncompleteRow {
                columns: 2,
                values: 3
            }
        ));
        assert!(err.is_test_definition_error());
    }

    #[test]
    fn row_split_mismatch() {
        let expected = tokens(&["1\ta\tx", "2\tb"]);
        let o = resolve(&expected, 2, 2, 2).unwrap();
        let err = o.expected_cells(&expected).expect_err("three fields");
        assert!(matches!(
            err,
            SltError::RowSplit {
                row: 0,
                expected: 2,
                actual: 3
            }
        ));
    }
}
