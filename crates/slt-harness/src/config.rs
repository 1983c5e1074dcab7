//! Verifier configuration.
//!
//! A `VerifyConfig` is fixed for the duration of one test run. Every field
//! has a default, so a TOML file only needs the keys it overrides.

use serde::{Deserialize, Serialize};
use slt_error::{Result, SltError};

/// Error substrings that mark an execution failure as an environment
/// limitation (e.g. no network) rather than an engine bug.
pub const DEFAULT_SKIP_ERROR_PATTERNS: [&str; 2] = ["HTTP", "Unable to connect"];

/// Error substrings that are never an acceptable "expected" failure.
pub const DEFAULT_INTERNAL_ERROR_PATTERNS: [&str; 1] = ["INTERNAL Error"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Value count above which results are compared by digest instead of
    /// literally. `0` disables threshold hashing.
    pub hash_threshold: u64,
    /// Print fractional numeric columns as truncated integers, as legacy
    /// test corpora expect.
    pub legacy_float_format: bool,
    /// Report the digest of every query result instead of comparing it.
    pub output_hash_mode: bool,
    /// Log every query result before comparing it.
    pub output_result_mode: bool,
    pub skip_error_patterns: Vec<String>,
    pub internal_error_patterns: Vec<String>,
    /// Relative tolerance for FLOAT/DOUBLE equality; `0.0` means exact.
    pub float_tolerance: f64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            hash_threshold: 0,
            legacy_float_format: false,
            output_hash_mode: false,
            output_result_mode: false,
            skip_error_patterns: DEFAULT_SKIP_ERROR_PATTERNS
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            internal_error_patterns: DEFAULT_INTERNAL_ERROR_PATTERNS
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            float_tolerance: 0.0,
        }
    }
}

impl VerifyConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `SltError::Config` on malformed TOML, unknown value types, or
    /// a negative/non-finite `float_tolerance`.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|err| SltError::Config {
            detail: err.to_string(),
        })?;
        if !config.float_tolerance.is_finite() || config.float_tolerance < 0.0 {
            return Err(SltError::Config {
                detail: format!(
                    "float_tolerance must be a non-negative number, got {}",
                    config.float_tolerance
                ),
            });
        }
        Ok(config)
    }

    /// Whether threshold hashing applies to a result of `total_values` cells.
    pub const fn exceeds_hash_threshold(&self, total_values: u64) -> bool {
        self.hash_threshold > 0 && total_values > self.hash_threshold
    }

    pub fn is_skippable_error(&self, message: &str) -> bool {
        self.skip_error_patterns
            .iter()
            .any(|pattern| message.contains(pattern.as_str()))
    }

    pub fn is_internal_error(&self, message: &str) -> bool {
        self.internal_error_patterns
            .iter()
            .any(|pattern| message.contains(pattern.as_str()))
    }
}
