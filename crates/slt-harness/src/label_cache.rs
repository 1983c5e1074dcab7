//! Run-scoped store of labeled result digests.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use slt_types::QueryResult;

#[derive(Debug, Clone)]
struct LabelEntry {
    digest: String,
    snapshot: QueryResult,
}

/// Outcome of [`LabelCache::get_or_set`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelLookup {
    pub is_first: bool,
    pub stored_digest: String,
}

impl LabelLookup {
    /// Whether `digest` agrees with the stored one.
    pub fn matches(&self, digest: &str) -> bool {
        self.stored_digest == digest
    }
}

/// Maps a label to the first digest and result seen for it.
///
/// One cache belongs to one test run. It is not shared between threads;
/// runs executing concurrently each own their own cache.
#[derive(Debug, Default)]
pub struct LabelCache {
    entries: HashMap<String, LabelEntry>,
}

impl LabelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `(digest, snapshot())` on the first call for `label`; later
    /// calls return the stored digest and never invoke `snapshot`.
    pub fn get_or_set(
        &mut self,
        label: &str,
        digest: &str,
        snapshot: impl FnOnce() -> QueryResult,
    ) -> LabelLookup {
        match self.entries.entry(label.to_owned()) {
            Entry::Occupied(entry) => LabelLookup {
                is_first: false,
                stored_digest: entry.get().digest.clone(),
            },
            Entry::Vacant(entry) => {
                entry.insert(LabelEntry {
                    digest: digest.to_owned(),
                    snapshot: snapshot(),
                });
                LabelLookup {
                    is_first: true,
                    stored_digest: digest.to_owned(),
                }
            }
        }
    }

    /// The result retained for `label`, for mismatch diagnostics.
    pub fn snapshot(&self, label: &str) -> Option<&QueryResult> {
        self.entries.get(label).map(|entry| &entry.snapshot)
    }

    pub fn digest(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(|entry| entry.digest.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use slt_types::{LogicalType, Value};

    fn result_of(v: i32) -> QueryResult {
        let mut builder =
            QueryResult::builder(vec!["v".to_owned()], vec![LogicalType::Integer]).unwrap();
        builder.push_row(vec![Value::Integer(v)]).unwrap();
        builder.finish()
    }

    #[test]
    fn first_call_stores() {
        let mut cache = LabelCache::new();
        assert!(cache.is_empty());
        let lookup = cache.get_or_set("L1", "1 values hashing to aa", || result_of(1));
        assert!(lookup.is_first);
        assert!(lookup.matches("1 values hashing to aa"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.snapshot("L1"), Some(&result_of(1)));
    }

    #[test]
    fn later_calls_keep_the_first_entry() {
        let mut cache = LabelCache::new();
        cache.get_or_set("L1", "D", || result_of(1));
        let lookup = cache.get_or_set("L1", "D2", || panic!("snapshot taken for a known label"));
        assert!(!lookup.is_first);
        assert_eq!(lookup.stored_digest, "D");
        assert!(!lookup.matches("D2"));
        assert_eq!(cache.digest("L1"), Some("D"));
        assert_eq!(cache.snapshot("L1"), Some(&result_of(1)));
        assert!(cache.snapshot("L2").is_none());
    }
}
