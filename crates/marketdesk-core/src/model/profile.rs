use crate::entity::{CollectionName, EntityKind, RecordId, null_as_default};
use serde::{Deserialize, Serialize};

///
/// ProviderProfile
///
/// Public profile of a service provider (`prestador`).
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ProviderProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub bio: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub services: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub portfolio_urls: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub certifications: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl EntityKind for ProviderProfile {
    const COLLECTION: CollectionName = CollectionName::PROVIDER_PROFILE;
}
