use crate::entity::{Payload, Record, RecordId};
use derive_more::Display;

///
/// MutationKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum MutationKind {
    #[display("create")]
    Create,

    #[display("update")]
    Update,

    #[display("delete")]
    Delete,

    #[display("bulk_create")]
    BulkCreate,
}

///
/// Mutation
///
/// One write against a collection. Every successful mutation invalidates all
/// cached reads of that collection.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    Create(Payload),
    Update { id: RecordId, patch: Payload },
    Delete { id: RecordId },
    BulkCreate(Vec<Payload>),
}

impl Mutation {
    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        match self {
            Self::Create(_) => MutationKind::Create,
            Self::Update { .. } => MutationKind::Update,
            Self::Delete { .. } => MutationKind::Delete,
            Self::BulkCreate(_) => MutationKind::BulkCreate,
        }
    }
}

///
/// MutationOutcome
///
/// What the platform returned for a successful mutation.
///

#[derive(Clone, Debug, PartialEq)]
pub enum MutationOutcome {
    Created(Record),
    Updated(Record),
    Deleted(RecordId),
    BulkCreated(Vec<Record>),
}

impl MutationOutcome {
    /// Records written by this mutation (none for deletes).
    #[must_use]
    pub fn records(&self) -> &[Record] {
        match self {
            Self::Created(record) | Self::Updated(record) => std::slice::from_ref(record),
            Self::BulkCreated(records) => records,
            Self::Deleted(_) => &[],
        }
    }

    /// Return the single written record, if this outcome carries exactly one.
    #[must_use]
    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Created(record) | Self::Updated(record) => Some(record),
            Self::BulkCreated(_) | Self::Deleted(_) => None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        match self {
            Self::Created(_) => MutationKind::Create,
            Self::Updated(_) => MutationKind::Update,
            Self::Deleted(_) => MutationKind::Delete,
            Self::BulkCreated(_) => MutationKind::BulkCreate,
        }
    }
}
