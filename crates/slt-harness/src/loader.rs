//! File-backed expectations (`<FILE>:path`).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use slt_error::{Result, SltError};

use crate::serialize::NULL_TEXT;

/// Literal values loaded from an external result file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedExpectation {
    /// Row-major values.
    pub values: Vec<String>,
    /// Column count of the file; replaces the declared column count.
    pub column_count: usize,
}

/// Resolves a file reference into literal expected values.
///
/// `column_names` are the actual result's names; every field is read as
/// text.
pub trait ExternalResultLoader {
    /// # Errors
    ///
    /// Returns `SltError::ExternalFile` when the file cannot be read or does
    /// not match the result's shape.
    fn load(&self, path: &Path, column_names: &[String]) -> Result<LoadedExpectation>;
}

/// Reads `|`-separated text with one header row.
///
/// Empty fields load as `NULL`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipeDelimitedReader;

impl PipeDelimitedReader {
    pub const SEPARATOR: char = '|';
}

impl ExternalResultLoader for PipeDelimitedReader {
    fn load(&self, path: &Path, column_names: &[String]) -> Result<LoadedExpectation> {
        let file_error = |detail: String| SltError::ExternalFile {
            path: path.to_path_buf(),
            detail,
        };
        let text = fs::read_to_string(path).map_err(|err| file_error(err.to_string()))?;
        let column_count = column_names.len();

        let mut lines = text.lines().map(|line| line.strip_suffix('\r').unwrap_or(line));
        let header = lines
            .next()
            .ok_or_else(|| file_error("file is empty; a header row is required".to_owned()))?;
        let header_fields = header.split(Self::SEPARATOR).count();
        if header_fields != column_count {
            return Err(file_error(format!(
                "header has {header_fields} columns, but the result has {column_count}"
            )));
        }

        let mut values = Vec::new();
        for (index, line) in lines.enumerate() {
            if line.is_empty() {
                continue;
            }
            let before = values.len();
            values.extend(line.split(Self::SEPARATOR).map(|field| {
                if field.is_empty() {
                    NULL_TEXT.to_owned()
                } else {
                    field.to_owned()
                }
            }));
            let fields = values.len() - before;
            if fields != column_count {
                // Line numbers are 1-based and count the header.
                return Err(file_error(format!(
                    "line {} has {fields} columns, expected {column_count}",
                    index + 2
                )));
            }
        }
        Ok(LoadedExpectation {
            values,
            column_count,
        })
    }
}

/// Replace every `${name}` in `path` with its loop binding.
///
/// Unbound names are left as written.
pub fn substitute_loop_variables(path: &Path, bindings: &HashMap<String, String>) -> PathBuf {
    let mut text = path.to_string_lossy().into_owned();
    for (name, value) in bindings {
        text = text.replace(&format!("${{{name}}}"), value);
    }
    PathBuf::from(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write as _;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn reads_rows_after_header() {
        let file = write_file("a|b\n1|x\n2|\n");
        let loaded = PipeDelimitedReader
            .load(file.path(), &names(&["a", "b"]))
            .expect("load");
        assert_eq!(loaded.column_count, 2);
        assert_eq!(loaded.values, names(&["1", "x", "2", "NULL"]));
    }

    #[test]
    fn crlf_and_trailing_blank_lines() {
        let file = write_file("a\r\n1\r\n2\r\n\r\n");
        let loaded = PipeDelimitedReader.load(file.path(), &names(&["a"])).expect("load");
        assert_eq!(loaded.values, names(&["1", "2"]));
    }

    #[test]
    fn shape_errors_are_test_definition_errors() {
        let file = write_file("a|b\n1|2|3\n");
        let err = PipeDelimitedReader
            .load(file.path(), &names(&["a", "b"]))
            .expect_err("ragged row");
        assert!(err.is_test_definition_error());
        assert!(err.to_string().contains("line 2 has 3 columns"), "{err}");

        let err = PipeDelimitedReader
            .load(file.path(), &names(&["a"]))
            .expect_err("header width");
        assert!(err.to_string().contains("header has 2 columns"), "{err}");
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = PipeDelimitedReader
            .load(&dir.path().join("absent.csv"), &names(&["a"]))
            .expect_err("missing");
        assert!(matches!(err, SltError::ExternalFile { .. }));
    }

    #[test]
    fn loop_substitution() {
        let bindings: HashMap<String, String> = [("i".to_owned(), "3".to_owned())].into();
        assert_eq!(
            substitute_loop_variables(Path::new("data/part_${i}_${j}.csv"), &bindings),
            PathBuf::from("data/part_3_${j}.csv")
        );
    }
}
