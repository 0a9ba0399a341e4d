//! Cache keys for entity reads and their stable fingerprints.

use crate::entity::{CollectionName, Filter, Sort};
use sha2::{Digest, Sha256};
use std::fmt;

///
/// QueryKey
///
/// Identity of one cached read: collection plus the filter tuple, sort, and
/// limit it was issued with.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct QueryKey {
    pub collection: CollectionName,
    pub filter: Filter,
    pub sort: Option<Sort>,
    pub limit: Option<usize>,
}

impl QueryKey {
    /// Unfiltered read of a whole collection.
    #[must_use]
    pub fn list(collection: CollectionName) -> Self {
        Self {
            collection,
            filter: Filter::new(),
            sort: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn filtered(collection: CollectionName, filter: Filter) -> Self {
        Self {
            filter,
            ..Self::list(collection)
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Compute a stable fingerprint for this key.
    #[must_use]
    pub fn fingerprint(&self) -> QueryFingerprint {
        let mut hasher = Sha256::new();
        hasher.update(b"querykey:v1");

        write_tag(&mut hasher, 0x01);
        write_str(&mut hasher, self.collection.as_str());

        write_tag(&mut hasher, 0x02);
        write_str(&mut hasher, &self.filter.canonical());

        write_tag(&mut hasher, 0x03);
        match &self.sort {
            Some(sort) => write_str(&mut hasher, &sort.to_string()),
            None => write_tag(&mut hasher, 0x00),
        }

        write_tag(&mut hasher, 0x04);
        match self.limit {
            Some(limit) => hasher.update(u64::try_from(limit).unwrap_or(u64::MAX).to_be_bytes()),
            None => write_tag(&mut hasher, 0x00),
        }

        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);

        QueryFingerprint(out)
    }
}

///
/// QueryFingerprint
///
/// Deterministic digest of a QueryKey, used to correlate log lines.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct QueryFingerprint([u8; 32]);

impl QueryFingerprint {
    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    /// First 16 hex characters; enough to tell keys apart in logs.
    #[must_use]
    pub fn short(&self) -> String {
        let mut hex = self.as_hex();
        hex.truncate(16);
        hex
    }
}

impl fmt::Display for QueryFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short())
    }
}

fn write_str(hasher: &mut Sha256, value: &str) {
    hasher.update(u32::try_from(value.len()).unwrap_or(u32::MAX).to_be_bytes());
    hasher.update(value.as_bytes());
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_across_filter_order() {
        let a = QueryKey::filtered(
            CollectionName::TRANSACTION,
            Filter::new().field_eq("status", "Validado").field_eq("type", "Receita"),
        );
        let b = QueryKey::filtered(
            CollectionName::TRANSACTION,
            Filter::new().field_eq("type", "Receita").field_eq("status", "Validado"),
        );

        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().as_hex().len(), 64);
        assert_eq!(a.fingerprint().to_string().len(), 16);
    }

    #[test]
    fn fingerprint_separates_sort_limit_and_collection() {
        let base = QueryKey::list(CollectionName::TRANSACTION);
        let sorted = base.clone().with_sort(Sort::desc("date"));
        let limited = base.clone().with_limit(10);
        let other = QueryKey::list(CollectionName::BOOKING);

        let prints = [
            base.fingerprint(),
            sorted.fingerprint(),
            limited.fingerprint(),
            other.fingerprint(),
        ];
        for (i, a) in prints.iter().enumerate() {
            for b in &prints[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
