//! Result verification for sqllogictest-style SQL test files.
//!
//! Given the materialized output of a query and the expectation written in a
//! test file, [`VerificationContext::verify`] decides pass or fail and
//! renders a diagnostic. The pipeline is:
//!
//! - [`serialize`]: typed cells to canonical text, flattened row-major
//! - [`sort`]: optional row or value normalization
//! - [`orientation`]: row-wise or column-wise expected layout
//! - [`hash`] and [`label_cache`]: digest comparison for large or labeled
//!   results
//! - [`compare`]: per-cell exact, regex, numeric or boolean comparison
//! - [`verify`]: the orchestration and outcome reporting

pub mod compare;
pub mod config;
pub mod diagnostics;
pub mod expectation;
pub mod hash;
pub mod label_cache;
pub mod loader;
pub mod orientation;
pub mod outcome;
pub mod serialize;
pub mod sort;
pub mod verify;

pub use compare::{CellComparison, ComparisonCategory, ParsedValue, ValueComparator};
pub use config::VerifyConfig;
pub use expectation::{Expectation, HashDescriptor, QueryStep, SortStyle, StatementStep};
pub use hash::{HashAggregator, digest_values};
pub use label_cache::{LabelCache, LabelLookup};
pub use loader::{ExternalResultLoader, LoadedExpectation, PipeDelimitedReader};
pub use orientation::Orientation;
pub use outcome::{ComparisonOutcome, OutcomeKind};
pub use serialize::{FlattenedResult, flatten_result, serialize_value};
pub use verify::VerificationContext;
