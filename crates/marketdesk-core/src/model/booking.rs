use crate::entity::{CollectionName, EntityKind, RecordId, null_as_default};
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// BookingStatus
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum BookingStatus {
    Pendente,
    Confirmado,
    #[display("Concluído")]
    #[serde(rename = "Concluído")]
    Concluido,
    Cancelado,
}

impl BookingStatus {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pendente" => Some(Self::Pendente),
            "Confirmado" => Some(Self::Confirmado),
            "Concluído" | "Concluido" => Some(Self::Concluido),
            "Cancelado" => Some(Self::Cancelado),
            _ => None,
        }
    }
}

///
/// Booking
///
/// A client's reservation of a provider's service.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Booking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub service_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub client_email: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub provider_email: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub scheduled_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Booking {
    #[must_use]
    pub fn status(&self) -> Option<BookingStatus> {
        BookingStatus::parse(&self.status)
    }
}

impl EntityKind for Booking {
    const COLLECTION: CollectionName = CollectionName::BOOKING;
}
