use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use ulid::Ulid;

/// Field payload sent to create/update calls.
pub type Payload = Map<String, Value>;

/// Fields owned by the platform; never taken from a write payload.
pub const RESERVED_FIELDS: [&str; 3] = ["id", "created_by", "created_date"];

///
/// RecordId
///
/// Platform-assigned record identifier.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, time-ordered identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

///
/// CollectionName
///
/// Name of a platform entity collection (`Transaction`, `Booking`, ...).
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct CollectionName(Cow<'static, str>);

impl CollectionName {
    pub const TRANSACTION: Self = Self::from_static("Transaction");
    pub const SERVICE_LISTING: Self = Self::from_static("ServiceListing");
    pub const PROVIDER_PROFILE: Self = Self::from_static("ProviderProfile");
    pub const BOOKING: Self = Self::from_static("Booking");
    pub const REVIEW: Self = Self::from_static("Review");
    pub const DEPLOYMENT_CHECKLIST: Self = Self::from_static("DeploymentChecklist");

    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for CollectionName {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

///
/// Record
///
/// An entity as the platform returns it: identity, creator, creation time,
/// and an open set of domain fields.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Record {
    pub id: RecordId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,

    #[serde(flatten)]
    pub fields: Payload,
}

impl Record {
    /// Build a record from a write payload; reserved keys in the payload are dropped.
    #[must_use]
    pub fn from_payload(
        id: RecordId,
        created_by: Option<String>,
        created_date: Option<String>,
        payload: Payload,
    ) -> Self {
        let mut record = Self {
            id,
            created_by,
            created_date,
            fields: Payload::new(),
        };
        record.apply_patch(payload);

        record
    }

    /// Resolve a field by name, including the platform-owned ones.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        match name {
            "id" => Some(Cow::Owned(Value::String(self.id.to_string()))),
            "created_by" => self
                .created_by
                .as_ref()
                .map(|email| Cow::Owned(Value::String(email.clone()))),
            "created_date" => self
                .created_date
                .as_ref()
                .map(|date| Cow::Owned(Value::String(date.clone()))),
            _ => self.fields.get(name).map(Cow::Borrowed),
        }
    }

    /// Merge a patch into the domain fields. Reserved keys are ignored.
    pub fn apply_patch(&mut self, patch: Payload) {
        for (name, value) in patch {
            if RESERVED_FIELDS.contains(&name.as_str()) {
                continue;
            }
            self.fields.insert(name, value);
        }
    }

    /// True when every non-reserved field of `payload` is present with an equal value.
    #[must_use]
    pub fn matches_payload(&self, payload: &Payload) -> bool {
        payload
            .iter()
            .filter(|(name, _)| !RESERVED_FIELDS.contains(&name.as_str()))
            .all(|(name, value)| self.fields.get(name) == Some(value))
    }
}

///
/// TESTS
///
