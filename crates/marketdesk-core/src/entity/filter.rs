use crate::entity::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    hash::{Hash, Hasher},
};

///
/// Filter
///
/// Conjunction of field-equality constraints, the same shape the platform's
/// `filter` call accepts. An empty filter matches every record.
///
/// Fields are kept in a BTreeMap so two filters built in different orders
/// produce the same canonical form (and the same cache key).
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Filter {
    fields: BTreeMap<String, Value>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`.
    #[must_use]
    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Records created by the given user.
    #[must_use]
    pub fn created_by(self, email: impl Into<String>) -> Self {
        self.field_eq("created_by", Value::String(email.into()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(field, value)| (field.as_str(), value))
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Evaluate the filter against a record.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| record.field(field).as_deref() == Some(expected))
    }

    /// Deterministic text form used for hashing and fingerprints.
    #[must_use]
    pub fn canonical(&self) -> String {
        // Value maps are BTreeMap-backed, so nested objects are ordered too.
        serde_json::to_string(&self.fields).unwrap_or_default()
    }
}

impl Hash for Filter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl<K, V> FromIterator<(K, V)> for Filter
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        }
    }
}

///
/// TESTS
///
