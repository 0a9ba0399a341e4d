use crate::entity::{CollectionName, EntityKind, RecordId, null_as_default};
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// TransactionKind
///
/// Recognized values of a transaction's `type` field.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum TransactionKind {
    Receita,
    Despesa,
}

impl TransactionKind {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Receita" => Some(Self::Receita),
            "Despesa" => Some(Self::Despesa),
            _ => None,
        }
    }
}

///
/// TransactionStatus
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum TransactionStatus {
    Validado,
    Pendente,
    Rejeitado,
}

impl TransactionStatus {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Validado" => Some(Self::Validado),
            "Pendente" => Some(Self::Pendente),
            "Rejeitado" => Some(Self::Rejeitado),
            _ => None,
        }
    }
}

///
/// Transaction
///
/// A financial entry. `kind` keeps the raw `type` string so values outside
/// Receita/Despesa survive decoding and can be reported by the rollups.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Transaction {
    pub fn new(kind: TransactionKind, amount: f64, date: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            amount,
            date: date.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status.to_string();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn kind(&self) -> Option<TransactionKind> {
        TransactionKind::parse(&self.kind)
    }

    #[must_use]
    pub fn status(&self) -> Option<TransactionStatus> {
        TransactionStatus::parse(&self.status)
    }
}

impl EntityKind for Transaction {
    const COLLECTION: CollectionName = CollectionName::TRANSACTION;
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Payload, Record};
    use serde_json::json;

    #[test]
    fn decodes_from_record_including_platform_fields() {
        let Some(payload) = json!({ "type": "Despesa", "amount": 40, "date": "2024-01-20" })
            .as_object()
            .cloned()
        else {
            panic!("fixture must be an object");
        };
        let record = Record::from_payload(
            RecordId::new("t1"),
            Some("ana@example.com".into()),
            None,
            payload,
        );

        let tx = Transaction::from_record(&record).expect("transaction should decode");

        assert_eq!(tx.id, Some(RecordId::new("t1")));
        assert_eq!(tx.kind(), Some(TransactionKind::Despesa));
        assert!((tx.amount - 40.0).abs() < f64::EPSILON);
        assert_eq!(tx.created_by.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn payload_omits_platform_fields() {
        let mut tx = Transaction::new(TransactionKind::Receita, 100.0, "2024-01-05")
            .with_status(TransactionStatus::Validado);
        tx.id = Some(RecordId::new("t9"));
        tx.created_by = Some("x@example.com".into());

        let payload: Payload = tx.to_payload().expect("payload should encode");

        assert!(!payload.contains_key("id"));
        assert!(!payload.contains_key("created_by"));
        assert_eq!(payload.get("type"), Some(&json!("Receita")));
        assert_eq!(payload.get("status"), Some(&json!("Validado")));
    }

    #[test]
    fn unknown_kinds_are_kept_raw() {
        let tx: Transaction =
            serde_json::from_value(json!({ "type": "Transferência", "amount": 5 }))
                .expect("transaction should decode");

        assert_eq!(tx.kind, "Transferência");
        assert_eq!(tx.kind(), None);
    }

    #[test]
    fn null_fields_decode_as_defaults() {
        let tx: Transaction = serde_json::from_value(json!({
            "type": "Despesa",
            "amount": null,
            "date": "2024-01-20",
            "category": null,
            "status": null,
            "description": null
        }))
        .expect("null fields should decode");

        assert_eq!(tx.kind(), Some(TransactionKind::Despesa));
        assert!(tx.amount.abs() < f64::EPSILON);
        assert!(tx.category.is_empty());
        assert_eq!(tx.status(), None);
    }
}
