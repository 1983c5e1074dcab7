//! Expectation tokens and the query steps that carry them.
//!
//! The raw result lines of a `query` record are classified once, up front,
//! into an [`Expectation`]; downstream components branch on the variant and
//! never re-inspect string prefixes.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator between the value count and the digest in a hash descriptor.
pub const HASH_DESCRIPTOR_INFIX: &str = " values hashing to ";
/// Length of the hex digest in a hash descriptor.
pub const HASH_DIGEST_LEN: usize = 32;
/// Prefix of a token that names an external result file.
pub const FILE_PREFIX: &str = "<FILE>:";

/// Normalization applied to actual values before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortStyle {
    #[default]
    None,
    /// Sort whole rows lexicographically.
    Row,
    /// Sort every value independently.
    Value,
}

impl fmt::Display for SortStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("nosort"),
            Self::Row => f.write_str("rowsort"),
            Self::Value => f.write_str("valuesort"),
        }
    }
}

impl FromStr for SortStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nosort" => Ok(Self::None),
            "rowsort" => Ok(Self::Row),
            "valuesort" => Ok(Self::Value),
            other => Err(format!("unknown sort style: {other}")),
        }
    }
}

/// `<count> values hashing to <digest>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDescriptor {
    pub count: u64,
    pub digest: String,
}

impl HashDescriptor {
    /// Recognize a hash descriptor with a strict positional grammar: one or
    /// more ASCII digits, the literal infix, then exactly
    /// [`HASH_DIGEST_LEN`] lowercase hex characters. Anything else is not a
    /// hash.
    pub fn parse(token: &str) -> Option<Self> {
        let digits = token.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        if token.len() != digits + HASH_DESCRIPTOR_INFIX.len() + HASH_DIGEST_LEN {
            return None;
        }
        let (count, rest) = token.split_at(digits);
        let digest = rest.strip_prefix(HASH_DESCRIPTOR_INFIX)?;
        if !digest
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return None;
        }
        Some(Self {
            count: count.parse().ok()?,
            digest: digest.to_owned(),
        })
    }
}

impl fmt::Display for HashDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{HASH_DESCRIPTOR_INFIX}{}", self.count, self.digest)
    }
}

/// What a query step expects its result to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// Literal result lines: one value per line, or one tab-joined row per
    /// line.
    Literal(Vec<String>),
    /// A precomputed digest of the whole result.
    Hash(HashDescriptor),
    /// Literal values stored in an external pipe-delimited file.
    File(PathBuf),
    /// The result must hash like every other step bearing this label.
    Label(String),
}

impl Expectation {
    /// Classify the result lines of a query record.
    ///
    /// A single hash-descriptor line is a [`Expectation::Hash`] even when a
    /// label is present (both are then checked). Otherwise a label wins,
    /// since labeled results are always compared by digest. A single
    /// `<FILE>:` line is a [`Expectation::File`].
    pub fn parse(tokens: Vec<String>, label: Option<&str>) -> Self {
        if let [only] = tokens.as_slice() {
            if let Some(hash) = HashDescriptor::parse(only) {
                return Self::Hash(hash);
            }
        }
        if let Some(label) = label {
            return Self::Label(label.to_owned());
        }
        if let [only] = tokens.as_slice() {
            if let Some(path) = only.strip_prefix(FILE_PREFIX) {
                return Self::File(PathBuf::from(path));
            }
        }
        Self::Literal(tokens)
    }

    pub const fn is_hash_based(&self) -> bool {
        matches!(self, Self::Hash(_) | Self::Label(_))
    }
}

/// One `query` record: the SQL, how to read its result, and what to expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStep {
    pub file_name: String,
    pub line: usize,
    pub sql: String,
    /// Column count declared by the record header (`query III` -> 3).
    pub declared_column_count: usize,
    pub sort_style: SortStyle,
    pub label: Option<String>,
    pub expectation: Expectation,
}

impl QueryStep {
    pub fn new(
        sql: impl Into<String>,
        declared_column_count: usize,
        expectation: Expectation,
    ) -> Self {
        Self {
            file_name: String::new(),
            line: 0,
            sql: sql.into(),
            declared_column_count,
            sort_style: SortStyle::None,
            label: None,
            expectation,
        }
    }

    /// Build a step from raw result lines, classifying them with
    /// [`Expectation::parse`].
    pub fn from_lines(
        sql: impl Into<String>,
        declared_column_count: usize,
        lines: Vec<String>,
        label: Option<String>,
    ) -> Self {
        let expectation = Expectation::parse(lines, label.as_deref());
        Self {
            label,
            ..Self::new(sql, declared_column_count, expectation)
        }
    }

    #[must_use]
    pub fn at(mut self, file_name: impl Into<String>, line: usize) -> Self {
        self.file_name = file_name.into();
        self.line = line;
        self
    }

    #[must_use]
    pub const fn sorted(mut self, sort_style: SortStyle) -> Self {
        self.sort_style = sort_style;
        self
    }

    #[must_use]
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        if !matches!(self.expectation, Expectation::Hash(_)) {
            self.expectation = Expectation::Label(label.clone());
        }
        self.label = Some(label);
        self
    }

    /// The label this step hashes under: the record's label, or the one
    /// named by an [`Expectation::Label`].
    pub fn effective_label(&self) -> Option<&str> {
        self.label.as_deref().or(match &self.expectation {
            Expectation::Label(label) => Some(label.as_str()),
            _ => None,
        })
    }

    /// `file:line` for diagnostics.
    pub fn location(&self) -> String {
        format!("{}:{}", self.file_name, self.line)
    }
}

/// One `statement ok` / `statement error` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementStep {
    pub file_name: String,
    pub line: usize,
    pub sql: String,
    pub expect_ok: bool,
}

impl StatementStep {
    pub fn ok(sql: impl Into<String>) -> Self {
        Self {
            file_name: String::new(),
            line: 0,
            sql: sql.into(),
            expect_ok: true,
        }
    }

    pub fn error(sql: impl Into<String>) -> Self {
        Self {
            expect_ok: false,
            ..Self::ok(sql)
        }
    }

    #[must_use]
    pub fn at(mut self, file_name: impl Into<String>, line: usize) -> Self {
        self.file_name = file_name.into();
        self.line = line;
        self
    }

    pub fn location(&self) -> String {
        format!("{}:{}", self.file_name, self.line)
    }
}
