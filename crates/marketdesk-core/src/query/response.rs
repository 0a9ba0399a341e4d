use crate::{
    entity::{EntityKind, QueryFingerprint, Record},
    query::QueryError,
};
use std::{ops::Deref, sync::Arc};

///
/// QueryResponse
///
/// Rows for one read, shared with the cache entry that produced them.
///

#[derive(Clone, Debug, PartialEq)]
pub struct QueryResponse {
    records: Arc<Vec<Record>>,
    from_cache: bool,
    fingerprint: QueryFingerprint,
}

impl QueryResponse {
    pub(crate) const fn new(
        records: Arc<Vec<Record>>,
        from_cache: bool,
        fingerprint: QueryFingerprint,
    ) -> Self {
        Self {
            records,
            from_cache,
            fingerprint,
        }
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// True when served without a platform round-trip.
    #[must_use]
    pub const fn from_cache(&self) -> bool {
        self.from_cache
    }

    #[must_use]
    pub const fn fingerprint(&self) -> QueryFingerprint {
        self.fingerprint
    }

    /// Decode every row as `E`; the first failure aborts.
    pub fn decode<E: EntityKind>(&self) -> Result<Vec<E>, QueryError> {
        self.records
            .iter()
            .map(|record| {
                E::from_record(record).map_err(|err| QueryError::Decode {
                    collection: E::COLLECTION,
                    message: format!("{}: {err}", record.id),
                })
            })
            .collect()
    }
}

impl Deref for QueryResponse {
    type Target = [Record];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}
