//! MD5 fingerprint of a serialized value sequence.
//!
//! The digest is an equality fingerprint, not a security primitive; MD5 is
//! kept because existing test corpora store `N values hashing to <md5>`.

use std::fmt::Write as _;

use md5::{Digest, Md5};

use crate::expectation::HashDescriptor;

/// Incremental digest: feed each value followed by a newline.
#[derive(Debug, Clone, Default)]
pub struct HashAggregator {
    hasher: Md5,
    count: u64,
}

impl HashAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: &str) {
        self.hasher.update(value.as_bytes());
        self.hasher.update(b"\n");
        self.count += 1;
    }

    pub fn finish(self) -> HashDescriptor {
        let digest = self.hasher.finalize();
        let mut hex = String::with_capacity(32);
        for byte in digest {
            let _ = write!(hex, "{byte:02x}");
        }
        HashDescriptor {
            count: self.count,
            digest: hex,
        }
    }
}

/// Digest a full value sequence.
pub fn digest_values<I, S>(values: I) -> HashDescriptor
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut aggregator = HashAggregator::new();
    for value in values {
        aggregator.add(value.as_ref());
    }
    aggregator.finish()
}
