//! Materialized query results.

use std::fmt::Write as _;

use slt_error::{Result, SltError};

use crate::{DataChunk, LogicalType, Value};

/// Default number of rows per chunk produced by [`QueryResultBuilder`].
pub const STANDARD_VECTOR_SIZE: usize = 1024;

/// The fully materialized output of one query execution.
///
/// Invariants: `row_count()` is the sum of the chunk sizes, and every chunk
/// has exactly `column_count()` vectors typed as `types()`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    success: bool,
    error: Option<String>,
    names: Vec<String>,
    types: Vec<LogicalType>,
    chunks: Vec<DataChunk>,
}

impl QueryResult {
    /// A result for a query that failed with `error`.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            names: Vec::new(),
            types: Vec::new(),
            chunks: Vec::new(),
        }
    }

    /// Start building a successful result with the given schema.
    ///
    /// # Errors
    ///
    /// Returns `SltError::SchemaShape` if `names` and `types` differ in
    /// length.
    pub fn builder(names: Vec<String>, types: Vec<LogicalType>) -> Result<QueryResultBuilder> {
        if names.len() != types.len() {
            return Err(SltError::SchemaShape {
                names: names.len(),
                types: types.len(),
            });
        }
        Ok(QueryResultBuilder {
            chunk_capacity: STANDARD_VECTOR_SIZE,
            current: DataChunk::new(&types, STANDARD_VECTOR_SIZE),
            names,
            types,
            chunks: Vec::new(),
        })
    }

    /// Build a result from pre-assembled chunks.
    ///
    /// # Errors
    ///
    /// Returns `SltError::SchemaShape` for mismatched names/types,
    /// `SltError::ColumnCount` if a chunk has the wrong width, or
    /// `SltError::TypeMismatch` if a chunk column has the wrong type.
    pub fn from_chunks(
        names: Vec<String>,
        types: Vec<LogicalType>,
        chunks: Vec<DataChunk>,
    ) -> Result<Self> {
        if names.len() != types.len() {
            return Err(SltError::SchemaShape {
                names: names.len(),
                types: types.len(),
            });
        }
        for chunk in &chunks {
            if chunk.column_count() != types.len() {
                return Err(SltError::ColumnCount {
                    expected: types.len(),
                    actual: chunk.column_count(),
                });
            }
            for (vector, &ty) in chunk.columns().iter().zip(&types) {
                if vector.logical_type() != ty {
                    return Err(SltError::TypeMismatch {
                        expected: ty.to_string(),
                        actual: vector.logical_type().to_string(),
                    });
                }
            }
        }
        Ok(Self {
            success: true,
            error: None,
            names,
            types,
            chunks,
        })
    }

    pub const fn is_success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn types(&self) -> &[LogicalType] {
        &self.types
    }

    pub fn chunks(&self) -> &[DataChunk] {
        &self.chunks
    }

    pub fn column_count(&self) -> usize {
        self.types.len()
    }

    pub fn row_count(&self) -> usize {
        self.chunks.iter().map(DataChunk::size).sum()
    }

    /// Fetch a value by global row index, walking the chunks.
    pub fn value(&self, column: usize, row: usize) -> Option<Value> {
        let mut offset = row;
        for chunk in &self.chunks {
            if offset < chunk.size() {
                return Some(chunk.value(column, offset));
            }
            offset -= chunk.size();
        }
        None
    }

    /// Render the result as text: names, types, a row count line, then one
    /// tab-separated line per row.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.success {
            let _ = writeln!(
                out,
                "Query Error: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
            return out;
        }
        let _ = writeln!(out, "{}", self.names.join("\t"));
        let types: Vec<String> = self.types.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "{}", types.join("\t"));
        let _ = writeln!(out, "[ Rows: {}]", self.row_count());
        for chunk in &self.chunks {
            for row in 0..chunk.size() {
                let cells: Vec<String> = (0..chunk.column_count())
                    .map(|column| chunk.value(column, row).to_string())
                    .collect();
                let _ = writeln!(out, "{}", cells.join("\t"));
            }
        }
        out
    }
}

/// Accumulates rows into fixed-capacity chunks.
#[derive(Debug)]
pub struct QueryResultBuilder {
    names: Vec<String>,
    types: Vec<LogicalType>,
    chunk_capacity: usize,
    chunks: Vec<DataChunk>,
    current: DataChunk,
}

impl QueryResultBuilder {
    /// Override the number of rows per chunk (minimum 1).
    #[must_use]
    pub fn chunk_capacity(mut self, capacity: usize) -> Self {
        self.chunk_capacity = capacity.max(1);
        self
    }

    /// Append a row.
    ///
    /// # Errors
    ///
    /// Returns the chunk's error for a row of the wrong width or with a
    /// mistyped value.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        self.current.append_row(row)?;
        if self.current.size() >= self.chunk_capacity {
            let full = std::mem::replace(
                &mut self.current,
                DataChunk::new(&self.types, self.chunk_capacity),
            );
            self.chunks.push(full);
        }
        Ok(())
    }

    /// Append many rows.
    ///
    /// # Errors
    ///
    /// Stops at the first row that fails [`Self::push_row`].
    pub fn extend_rows<I>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        for row in rows {
            self.push_row(row)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> QueryResult {
        if self.current.size() > 0 {
            self.chunks.push(self.current);
        }
        QueryResult {
            success: true,
            error: None,
            names: self.names,
            types: self.types,
            chunks: self.chunks,
        }
    }
}
