use crate::entity::{CollectionName, EntityKind, RecordId, null_as_default};
use serde::{Deserialize, Serialize};

///
/// DeploymentChecklist
///
/// Go-live checklist tracked by the admin panel; one flag per step.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeploymentChecklist {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(deserialize_with = "null_as_default")]
    pub domain_configured: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub ssl_enabled: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub env_vars_set: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub database_migrated: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub backups_enabled: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub monitoring_enabled: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub payments_tested: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub legal_pages_published: bool,
}

impl EntityKind for DeploymentChecklist {
    const COLLECTION: CollectionName = CollectionName::DEPLOYMENT_CHECKLIST;
}
