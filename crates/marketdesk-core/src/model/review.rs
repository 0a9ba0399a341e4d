use crate::entity::{CollectionName, EntityKind, RecordId, null_as_default};
use serde::{Deserialize, Serialize};

///
/// Review
///
/// Client review of a completed booking. `rating` is expected in 1..=5.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Review {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: u8,

    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub provider_email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl EntityKind for Review {
    const COLLECTION: CollectionName = CollectionName::REVIEW;
}
