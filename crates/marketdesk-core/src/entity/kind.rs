use crate::entity::{CollectionName, Payload, RESERVED_FIELDS, Record};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned, ser::Error as _};
use serde_json::Value;

///
/// EntityKind
///
/// A typed view over one platform collection. Decoding goes through the
/// record's JSON form, so unknown fields are ignored and platform-owned
/// fields (`id`, `created_by`, `created_date`) are available to the type.
///

pub trait EntityKind: Serialize + DeserializeOwned {
    const COLLECTION: CollectionName;

    fn from_record(record: &Record) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(record)?)
    }

    /// Encode into a write payload without the platform-owned fields.
    fn to_payload(&self) -> Result<Payload, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(mut map) => {
                for field in RESERVED_FIELDS {
                    map.remove(field);
                }
                Ok(map)
            }
            other => Err(serde_json::Error::custom(format!(
                "{} must encode as an object, got {other}",
                Self::COLLECTION
            ))),
        }
    }
}

/// Field deserializer that reads an explicit `null` as the type's default,
/// the same as a missing key. Pair it with `#[serde(default)]`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
