//! Typed column vectors and the chunks that group them.

use slt_error::{Result, SltError};

use crate::{LogicalType, Value};

/// Physical storage for one column of a chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorData {
    Boolean(Vec<bool>),
    TinyInt(Vec<i8>),
    SmallInt(Vec<i16>),
    Integer(Vec<i32>),
    BigInt(Vec<i64>),
    HugeInt(Vec<i128>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Decimal(Vec<i128>),
    Varchar(Vec<String>),
    Blob(Vec<Vec<u8>>),
    Date(Vec<i32>),
}

impl VectorData {
    fn for_type(logical_type: LogicalType, capacity: usize) -> Self {
        match logical_type {
            LogicalType::Boolean => Self::Boolean(Vec::with_capacity(capacity)),
            LogicalType::TinyInt => Self::TinyInt(Vec::with_capacity(capacity)),
            LogicalType::SmallInt => Self::SmallInt(Vec::with_capacity(capacity)),
            LogicalType::Integer => Self::Integer(Vec::with_capacity(capacity)),
            LogicalType::BigInt => Self::BigInt(Vec::with_capacity(capacity)),
            LogicalType::HugeInt => Self::HugeInt(Vec::with_capacity(capacity)),
            LogicalType::Float => Self::Float(Vec::with_capacity(capacity)),
            LogicalType::Double => Self::Double(Vec::with_capacity(capacity)),
            LogicalType::Decimal { .. } => Self::Decimal(Vec::with_capacity(capacity)),
            LogicalType::Varchar => Self::Varchar(Vec::with_capacity(capacity)),
            LogicalType::Blob => Self::Blob(Vec::with_capacity(capacity)),
            LogicalType::Date => Self::Date(Vec::with_capacity(capacity)),
        }
    }

    const fn variant_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "BOOLEAN",
            Self::TinyInt(_) => "TINYINT",
            Self::SmallInt(_) => "SMALLINT",
            Self::Integer(_) => "INTEGER",
            Self::BigInt(_) => "BIGINT",
            Self::HugeInt(_) => "HUGEINT",
            Self::Float(_) => "FLOAT",
            Self::Double(_) => "DOUBLE",
            Self::Decimal(_) => "DECIMAL",
            Self::Varchar(_) => "VARCHAR",
            Self::Blob(_) => "BLOB",
            Self::Date(_) => "DATE",
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Boolean(v) => v.len(),
            Self::TinyInt(v) => v.len(),
            Self::SmallInt(v) => v.len(),
            Self::Integer(v) => v.len(),
            Self::BigInt(v) => v.len(),
            Self::HugeInt(v) | Self::Decimal(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Varchar(v) => v.len(),
            Self::Blob(v) => v.len(),
            Self::Date(v) => v.len(),
        }
    }

    /// Append a placeholder slot for a NULL row.
    fn push_default(&mut self) {
        match self {
            Self::Boolean(v) => v.push(false),
            Self::TinyInt(v) => v.push(0),
            Self::SmallInt(v) => v.push(0),
            Self::Integer(v) => v.push(0),
            Self::BigInt(v) => v.push(0),
            Self::HugeInt(v) | Self::Decimal(v) => v.push(0),
            Self::Float(v) => v.push(0.0),
            Self::Double(v) => v.push(0.0),
            Self::Varchar(v) => v.push(String::new()),
            Self::Blob(v) => v.push(Vec::new()),
            Self::Date(v) => v.push(0),
        }
    }
}

/// One column of a chunk: a typed payload plus a per-row validity mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    logical_type: LogicalType,
    data: VectorData,
    validity: Vec<bool>,
}

impl Vector {
    pub fn new(logical_type: LogicalType) -> Self {
        Self::with_capacity(logical_type, 0)
    }

    pub fn with_capacity(logical_type: LogicalType, capacity: usize) -> Self {
        Self {
            logical_type,
            data: VectorData::for_type(logical_type, capacity),
            validity: Vec::with_capacity(capacity),
        }
    }

    /// Build a vector from already-typed storage and a validity mask.
    ///
    /// # Errors
    ///
    /// Returns `SltError::TypeMismatch` if `data` does not match
    /// `logical_type`, or `SltError::RaggedChunk` if the mask length differs
    /// from the data length.
    pub fn from_parts(
        logical_type: LogicalType,
        data: VectorData,
        validity: Vec<bool>,
    ) -> Result<Self> {
        let expected = VectorData::for_type(logical_type, 0);
        if std::mem::discriminant(&expected) != std::mem::discriminant(&data) {
            return Err(SltError::TypeMismatch {
                expected: logical_type.to_string(),
                actual: data.variant_name().to_owned(),
            });
        }
        if validity.len() != data.len() {
            return Err(SltError::RaggedChunk {
                column: 0,
                expected: data.len(),
                actual: validity.len(),
            });
        }
        Ok(Self {
            logical_type,
            data,
            validity,
        })
    }

    pub const fn logical_type(&self) -> LogicalType {
        self.logical_type
    }

    pub fn len(&self) -> usize {
        self.validity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validity.is_empty()
    }

    pub fn is_valid(&self, row: usize) -> bool {
        self.validity[row]
    }

    /// Whether `value` can be stored in this vector.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self.logical_type, value) {
            (_, Value::Null)
            | (LogicalType::Boolean, Value::Boolean(_))
            | (LogicalType::TinyInt, Value::TinyInt(_))
            | (LogicalType::SmallInt, Value::SmallInt(_))
            | (LogicalType::Integer, Value::Integer(_))
            | (LogicalType::BigInt, Value::BigInt(_))
            | (LogicalType::HugeInt, Value::HugeInt(_))
            | (LogicalType::Float, Value::Float(_))
            | (LogicalType::Double, Value::Double(_))
            | (LogicalType::Varchar, Value::Varchar(_))
            | (LogicalType::Blob, Value::Blob(_))
            | (LogicalType::Date, Value::Date(_)) => true,
            (LogicalType::Decimal { scale, .. }, Value::Decimal { scale: actual, .. }) => {
                scale == *actual
            }
            _ => false,
        }
    }

    /// Append a value, which must match the vector's type or be NULL.
    ///
    /// # Errors
    ///
    /// Returns `SltError::TypeMismatch` when the value's variant does not
    /// belong to the vector's logical type.
    pub fn push(&mut self, value: Value) -> Result<()> {
        let logical_type = self.logical_type;
        let mismatch = |value: &Value| SltError::TypeMismatch {
            expected: logical_type.to_string(),
            actual: format!("{value:?}"),
        };
        match (&mut self.data, value) {
            (data, Value::Null) => {
                data.push_default();
                self.validity.push(false);
                return Ok(());
            }
            (VectorData::Boolean(v), Value::Boolean(x)) => v.push(x),
            (VectorData::TinyInt(v), Value::TinyInt(x)) => v.push(x),
            (VectorData::SmallInt(v), Value::SmallInt(x)) => v.push(x),
            (VectorData::Integer(v), Value::Integer(x)) => v.push(x),
            (VectorData::BigInt(v), Value::BigInt(x)) => v.push(x),
            (VectorData::HugeInt(v), Value::HugeInt(x)) => v.push(x),
            (VectorData::Float(v), Value::Float(x)) => v.push(x),
            (VectorData::Double(v), Value::Double(x)) => v.push(x),
            (VectorData::Decimal(v), Value::Decimal { value, scale }) => {
                let LogicalType::Decimal {
                    scale: declared, ..
                } = logical_type
                else {
                    return Err(mismatch(&Value::Decimal { value, scale }));
                };
                if scale != declared {
                    return Err(mismatch(&Value::Decimal { value, scale }));
                }
                v.push(value);
            }
            (VectorData::Varchar(v), Value::Varchar(x)) => v.push(x),
            (VectorData::Blob(v), Value::Blob(x)) => v.push(x),
            (VectorData::Date(v), Value::Date(x)) => v.push(x),
            (_, other) => return Err(mismatch(&other)),
        }
        self.validity.push(true);
        Ok(())
    }

    /// Materialize the value at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.len()`.
    pub fn get_value(&self, row: usize) -> Value {
        if !self.validity[row] {
            return Value::Null;
        }
        match &self.data {
            VectorData::Boolean(v) => Value::Boolean(v[row]),
            VectorData::TinyInt(v) => Value::TinyInt(v[row]),
            VectorData::SmallInt(v) => Value::SmallInt(v[row]),
            VectorData::Integer(v) => Value::Integer(v[row]),
            VectorData::BigInt(v) => Value::BigInt(v[row]),
            VectorData::HugeInt(v) => Value::HugeInt(v[row]),
            VectorData::Float(v) => Value::Float(v[row]),
            VectorData::Double(v) => Value::Double(v[row]),
            VectorData::Decimal(v) => {
                let scale = match self.logical_type {
                    LogicalType::Decimal { scale, .. } => scale,
                    _ => 0,
                };
                Value::Decimal {
                    value: v[row],
                    scale,
                }
            }
            VectorData::Varchar(v) => Value::Varchar(v[row].clone()),
            VectorData::Blob(v) => Value::Blob(v[row].clone()),
            VectorData::Date(v) => Value::Date(v[row]),
        }
    }
}

/// A bounded batch of rows stored column by column.
#[derive(Debug, Clone, PartialEq)]
pub struct DataChunk {
    columns: Vec<Vector>,
}

impl DataChunk {
    pub fn new(types: &[LogicalType], capacity: usize) -> Self {
        Self {
            columns: types
                .iter()
                .map(|&ty| Vector::with_capacity(ty, capacity))
                .collect(),
        }
    }

    /// Assemble a chunk from existing column vectors.
    ///
    /// # Errors
    ///
    /// Returns `SltError::RaggedChunk` if the vectors differ in length.
    pub fn from_vectors(columns: Vec<Vector>) -> Result<Self> {
        let expected = columns.first().map_or(0, Vector::len);
        if let Some((column, vector)) = columns
            .iter()
            .enumerate()
            .find(|(_, vector)| vector.len() != expected)
        {
            return Err(SltError::RaggedChunk {
                column,
                expected,
                actual: vector.len(),
            });
        }
        Ok(Self { columns })
    }

    /// Number of rows in the chunk.
    pub fn size(&self) -> usize {
        self.columns.first().map_or(0, Vector::len)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> &Vector {
        &self.columns[index]
    }

    pub fn columns(&self) -> &[Vector] {
        &self.columns
    }

    pub fn value(&self, column: usize, row: usize) -> Value {
        self.columns[column].get_value(row)
    }

    /// Append one row; on error the chunk is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `SltError::ColumnCount` for a row of the wrong width, or
    /// `SltError::TypeMismatch` if a value does not fit its column.
    pub fn append_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(SltError::ColumnCount {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        if let Some((vector, value)) = self
            .columns
            .iter()
            .zip(&row)
            .find(|(vector, value)| !vector.accepts(value))
        {
            return Err(SltError::TypeMismatch {
                expected: vector.logical_type().to_string(),
                actual: format!("{value:?}"),
            });
        }
        for (vector, value) in self.columns.iter_mut().zip(row) {
            vector.push(value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_read_back_with_nulls() {
        let mut vector = Vector::new(LogicalType::Integer);
        vector.push(Value::Integer(7)).unwrap();
        vector.push(Value::Null).unwrap();
        assert_eq!(vector.len(), 2);
        assert!(vector.is_valid(0));
        assert!(!vector.is_valid(1));
        assert_eq!(vector.get_value(0), Value::Integer(7));
        assert_eq!(vector.get_value(1), Value::Null);
    }

    #[test]
    fn push_rejects_wrong_variant() {
        let mut vector = Vector::new(LogicalType::Integer);
        let err = vector
            .push(Value::Varchar("x".to_owned()))
            .expect_err("varchar into integer column must fail");
        assert!(matches!(err, SltError::TypeMismatch { .. }));
        assert!(vector.is_empty());
    }

    #[test]
    fn decimal_scale_must_match() {
        let ty = LogicalType::Decimal {
            width: 9,
            scale: 2,
        };
        let mut vector = Vector::new(ty);
        vector
            .push(Value::Decimal {
                value: 150,
                scale: 2,
            })
            .unwrap();
        assert!(
            vector
                .push(Value::Decimal {
                    value: 15,
                    scale: 1
                })
                .is_err()
        );
        assert_eq!(vector.get_value(0).to_string(), "1.50");
    }

    #[test]
    fn from_parts_validates_shape() {
        let ok = Vector::from_parts(
            LogicalType::BigInt,
            VectorData::BigInt(vec![1, 2]),
            vec![true, false],
        )
        .unwrap();
        assert_eq!(ok.get_value(1), Value::Null);

        assert!(
            Vector::from_parts(
                LogicalType::Double,
                VectorData::BigInt(vec![1]),
                vec![true]
            )
            .is_err()
        );
        assert!(
            Vector::from_parts(LogicalType::BigInt, VectorData::BigInt(vec![1]), vec![]).is_err()
        );
    }

    #[test]
    fn chunk_append_row_is_atomic() {
        let mut chunk = DataChunk::new(&[LogicalType::Integer, LogicalType::Varchar], 4);
        chunk
            .append_row(vec![Value::Integer(1), Value::Varchar("a".to_owned())])
            .unwrap();
        let err = chunk
            .append_row(vec![Value::Integer(2), Value::Integer(3)])
            .expect_err("second column is VARCHAR");
        assert!(matches!(err, SltError::TypeMismatch { .. }));
        assert_eq!(chunk.size(), 1);
        assert_eq!(chunk.column(0).len(), 1);
        assert!(chunk.append_row(vec![Value::Integer(1)]).is_err());
    }

    #[test]
    fn ragged_vectors_rejected() {
        let mut a = Vector::new(LogicalType::Integer);
        a.push(Value::Integer(1)).unwrap();
        let b = Vector::new(LogicalType::Integer);
        let err = DataChunk::from_vectors(vec![a, b]).expect_err("ragged");
        assert!(matches!(err, SltError::RaggedChunk { column: 1, .. }));
    }
}
