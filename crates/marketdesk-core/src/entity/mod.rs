//! Entity vocabulary: opaque platform records, collection names, filters,
//! sort orders, cache keys, and write operations.

mod filter;
mod key;
mod kind;
mod mutation;
mod record;
mod sort;

pub use filter::Filter;
pub use key::{QueryFingerprint, QueryKey};
pub use kind::{EntityKind, null_as_default};
pub use mutation::{Mutation, MutationKind, MutationOutcome};
pub use record::{CollectionName, Payload, Record, RecordId, RESERVED_FIELDS};
pub use sort::{Direction, Sort, SortParseError};
