use crate::entity::{CollectionName, EntityKind, RecordId, null_as_default};
use serde::{Deserialize, Serialize};

///
/// ServiceListing
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ServiceListing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub provider_email: String,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

const fn default_active() -> bool {
    true
}

impl EntityKind for ServiceListing {
    const COLLECTION: CollectionName = CollectionName::SERVICE_LISTING;
}
