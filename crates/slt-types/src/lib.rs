//! Result-set data model for the sqllogictest verifier.
//!
//! The query engine materializes its output as a [`QueryResult`]: column
//! names and [`LogicalType`]s plus a sequence of [`DataChunk`]s, each holding
//! one typed [`Vector`] per column with a per-row validity mask. The
//! verifier only ever reads these structures.

pub mod logical_type;
pub mod result;
pub mod value;
pub mod vector;

pub use logical_type::LogicalType;
pub use result::{QueryResult, QueryResultBuilder, STANDARD_VECTOR_SIZE};
pub use value::Value;
pub use vector::{DataChunk, Vector, VectorData};
