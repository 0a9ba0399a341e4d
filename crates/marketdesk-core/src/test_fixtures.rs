use crate::{
    entity::Payload,
    model::{Transaction, TransactionKind, TransactionStatus},
    obs::{MetricsEvent, MetricsSink},
    session::{Role, SessionUser, UserType},
};
use serde_json::Value;
use std::sync::Mutex;

pub(crate) fn admin() -> SessionUser {
    SessionUser::new("u-admin", "admin@example.com")
        .with_full_name("Admin")
        .with_role(Role::Admin)
        .with_user_type(UserType::Prestador)
}

pub(crate) fn cliente() -> SessionUser {
    SessionUser::new("u-cliente", "cliente@example.com")
        .with_full_name("Carla Cliente")
        .with_user_type(UserType::Cliente)
}

pub(crate) fn prestador() -> SessionUser {
    SessionUser::new("u-prestador", "prestador@example.com")
        .with_full_name("Paulo Prestador")
        .with_user_type(UserType::Prestador)
}

pub(crate) fn indefinido() -> SessionUser {
    SessionUser::new("u-novo", "novo@example.com")
}

/// Unwrap a `json!` object literal into a payload.
pub(crate) fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("payload fixture must be an object, got {other}"),
    }
}

pub(crate) fn tx(kind: &str, amount: f64, date: &str) -> Transaction {
    Transaction {
        kind: kind.to_string(),
        amount,
        date: date.to_string(),
        ..Transaction::default()
    }
}

pub(crate) fn expense(category: &str, amount: f64, status: TransactionStatus) -> Transaction {
    Transaction::new(TransactionKind::Despesa, amount, "2024-03-10")
        .with_category(category)
        .with_status(status)
}

///
/// RecordingSink
///

#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<MetricsEvent>>,
}

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<MetricsEvent> {
        self.events
            .lock()
            .expect("recording sink lock should succeed")
            .clone()
    }
}

impl MetricsSink for RecordingSink {
    fn record(&self, event: MetricsEvent) {
        self.events
            .lock()
            .expect("recording sink lock should succeed")
            .push(event);
    }
}
