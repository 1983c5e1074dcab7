use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared SQL type of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    HugeInt,
    Float,
    Double,
    /// Fixed-point decimal; `scale` digits follow the decimal point.
    Decimal {
        width: u8,
        scale: u8,
    },
    Varchar,
    Blob,
    /// Calendar date stored as days since 1970-01-01.
    Date,
}

impl LogicalType {
    /// Largest decimal width representable in an `i128` payload.
    pub const MAX_DECIMAL_WIDTH: u8 = 38;

    /// Integer, floating-point and decimal types.
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::TinyInt
                | Self::SmallInt
                | Self::Integer
                | Self::BigInt
                | Self::HugeInt
                | Self::Float
                | Self::Double
                | Self::Decimal { .. }
        )
    }

    /// Numeric types that can carry a fractional part.
    pub const fn has_fraction(self) -> bool {
        matches!(self, Self::Float | Self::Double | Self::Decimal { .. })
    }

    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::Integer | Self::BigInt | Self::HugeInt
        )
    }

    /// The single-letter column marker used in `query` headers.
    pub const fn header_marker(self) -> char {
        match self {
            Self::Boolean
            | Self::TinyInt
            | Self::SmallInt
            | Self::Integer
            | Self::BigInt
            | Self::HugeInt => 'I',
            Self::Float | Self::Double | Self::Decimal { .. } => 'R',
            Self::Varchar | Self::Blob | Self::Date => 'T',
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => f.write_str("BOOLEAN"),
            Self::TinyInt => f.write_str("TINYINT"),
            Self::SmallInt => f.write_str("SMALLINT"),
            Self::Integer => f.write_str("INTEGER"),
            Self::BigInt => f.write_str("BIGINT"),
            Self::HugeInt => f.write_str("HUGEINT"),
            Self::Float => f.write_str("FLOAT"),
            Self::Double => f.write_str("DOUBLE"),
            Self::Decimal { width, scale } => write!(f, "DECIMAL({width},{scale})"),
            Self::Varchar => f.write_str("VARCHAR"),
            Self::Blob => f.write_str("BLOB"),
            Self::Date => f.write_str("DATE"),
        }
    }
}
