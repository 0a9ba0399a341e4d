//! In-process platform.
//!
//! Holds collections in memory, stamps `created_by`/`created_date` the way
//! the hosted platform does, and supports scripted faults and latency so
//! retry, sharing, and invalidation behaviour can be exercised end to end.

use crate::{
    entity::{CollectionName, Filter, Payload, Record, RecordId, Sort},
    platform::{LlmRequest, Platform, PlatformError},
    session::SessionUser,
};
use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use ulid::Ulid;

type FunctionHandler = Arc<dyn Fn(Value) -> Result<Value, PlatformError> + Send + Sync>;

///
/// PlatformCalls
///
/// Call counters, including calls that failed by injected fault.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PlatformCalls {
    pub auth: u64,
    pub reads: u64,
    pub writes: u64,
    pub integrations: u64,
}

#[derive(Default)]
struct Faults {
    auth: u32,
    reads: u32,
    writes: u32,
    integrations: u32,
}

#[derive(Default)]
struct MemoryState {
    user: Option<SessionUser>,
    collections: BTreeMap<CollectionName, Vec<Record>>,
    faults: Faults,
    calls: PlatformCalls,
    uploads: Vec<String>,
    llm_requests: Vec<LlmRequest>,
    llm_responses: VecDeque<Value>,
    functions: BTreeMap<String, FunctionHandler>,
}

///
/// MemoryPlatform
///

#[derive(Default)]
pub struct MemoryPlatform {
    state: Mutex<MemoryState>,
    latency: Duration,
}

impl MemoryPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user(self, user: SessionUser) -> Self {
        self.sign_in(user);
        self
    }

    /// Delay every call by `latency` before it touches state.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn sign_in(&self, user: SessionUser) {
        self.lock().user = Some(user);
    }

    pub fn sign_out(&self) {
        self.lock().user = None;
    }

    #[must_use]
    pub fn user(&self) -> Option<SessionUser> {
        self.lock().user.clone()
    }

    /// Insert records directly, bypassing counters and faults.
    pub fn seed(
        &self,
        collection: &CollectionName,
        payloads: impl IntoIterator<Item = Payload>,
    ) -> Vec<Record> {
        let mut state = self.lock();
        let created_by = state.user.as_ref().map(|user| user.email.clone());
        let rows = state.collections.entry(collection.clone()).or_default();

        payloads
            .into_iter()
            .map(|payload| {
                let record = new_record(created_by.clone(), payload);
                rows.push(record.clone());
                record
            })
            .collect()
    }

    /// Snapshot of a collection as stored, bypassing counters and faults.
    #[must_use]
    pub fn records(&self, collection: &CollectionName) -> Vec<Record> {
        self.lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    //
    // Fault injection
    //

    pub fn fail_next_auth(&self, count: u32) {
        self.lock().faults.auth = count;
    }

    pub fn fail_next_reads(&self, count: u32) {
        self.lock().faults.reads = count;
    }

    pub fn reject_next_writes(&self, count: u32) {
        self.lock().faults.writes = count;
    }

    pub fn fail_next_integrations(&self, count: u32) {
        self.lock().faults.integrations = count;
    }

    #[must_use]
    pub fn calls(&self) -> PlatformCalls {
        self.lock().calls
    }

    //
    // Integration scripting
    //

    /// Queue a response for the next `invoke_llm` call.
    pub fn script_llm_response(&self, response: Value) {
        self.lock().llm_responses.push_back(response);
    }

    #[must_use]
    pub fn llm_requests(&self) -> Vec<LlmRequest> {
        self.lock().llm_requests.clone()
    }

    #[must_use]
    pub fn uploads(&self) -> Vec<String> {
        self.lock().uploads.clone()
    }

    pub fn register_function(
        &self,
        name: impl Into<String>,
        handler: impl Fn(Value) -> Result<Value, PlatformError> + Send + Sync + 'static,
    ) {
        self.lock().functions.insert(name.into(), Arc::new(handler));
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn pause(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl Platform for MemoryPlatform {
    async fn me(&self) -> Result<Option<SessionUser>, PlatformError> {
        self.pause().await;
        let mut state = self.lock();
        state.calls.auth += 1;
        if take(&mut state.faults.auth) {
            return Err(PlatformError::unavailable("simulated auth outage"));
        }

        Ok(state.user.clone())
    }

    async fn logout(&self) -> Result<(), PlatformError> {
        self.pause().await;
        let mut state = self.lock();
        state.calls.auth += 1;
        if take(&mut state.faults.auth) {
            return Err(PlatformError::unavailable("simulated auth outage"));
        }
        state.user = None;

        Ok(())
    }

    async fn update_me(&self, patch: Payload) -> Result<SessionUser, PlatformError> {
        self.pause().await;
        let mut state = self.lock();
        state.calls.auth += 1;
        if take(&mut state.faults.auth) {
            return Err(PlatformError::unavailable("simulated auth outage"));
        }
        let Some(user) = state.user.as_ref() else {
            return Err(PlatformError::rejected("no user is signed in"));
        };

        let mut fields = match serde_json::to_value(user) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => return Err(PlatformError::rejected("user encodes as a non-object")),
            Err(err) => return Err(PlatformError::rejected(err.to_string())),
        };
        for (name, value) in patch {
            // identity and role are not self-service
            if matches!(name.as_str(), "id" | "email" | "role") {
                continue;
            }
            fields.insert(name, value);
        }
        let updated: SessionUser = serde_json::from_value(Value::Object(fields))
            .map_err(|err| PlatformError::rejected(err.to_string()))?;
        state.user = Some(updated.clone());

        Ok(updated)
    }

    async fn list(
        &self,
        collection: &CollectionName,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, PlatformError> {
        self.filter(collection, &Filter::new(), sort, limit).await
    }

    async fn filter(
        &self,
        collection: &CollectionName,
        filter: &Filter,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, PlatformError> {
        self.pause().await;
        let mut state = self.lock();
        state.calls.reads += 1;
        if take(&mut state.faults.reads) {
            return Err(PlatformError::unavailable("simulated read outage"));
        }

        let mut rows: Vec<Record> = state
            .collections
            .get(collection)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default();
        if let Some(sort) = sort {
            sort.apply(&mut rows);
        }
        if let Some(limit) = limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn create(
        &self,
        collection: &CollectionName,
        payload: Payload,
    ) -> Result<Record, PlatformError> {
        self.pause().await;
        let mut state = self.lock();
        begin_write(&mut state)?;

        let record = new_record(state.user.as_ref().map(|u| u.email.clone()), payload);
        state
            .collections
            .entry(collection.clone())
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    async fn update(
        &self,
        collection: &CollectionName,
        id: &RecordId,
        patch: Payload,
    ) -> Result<Record, PlatformError> {
        self.pause().await;
        let mut state = self.lock();
        begin_write(&mut state)?;

        let record = state
            .collections
            .get_mut(collection)
            .and_then(|rows| rows.iter_mut().find(|r| &r.id == id))
            .ok_or_else(|| not_found(collection, id))?;
        record.apply_patch(patch);

        Ok(record.clone())
    }

    async fn delete(
        &self,
        collection: &CollectionName,
        id: &RecordId,
    ) -> Result<(), PlatformError> {
        self.pause().await;
        let mut state = self.lock();
        begin_write(&mut state)?;

        let rows = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, id))?;
        let position = rows
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| not_found(collection, id))?;
        rows.remove(position);

        Ok(())
    }

    async fn bulk_create(
        &self,
        collection: &CollectionName,
        payloads: Vec<Payload>,
    ) -> Result<Vec<Record>, PlatformError> {
        self.pause().await;
        let mut state = self.lock();
        begin_write(&mut state)?;

        let created_by = state.user.as_ref().map(|u| u.email.clone());
        let records: Vec<Record> = payloads
            .into_iter()
            .map(|payload| new_record(created_by.clone(), payload))
            .collect();
        state
            .collections
            .entry(collection.clone())
            .or_default()
            .extend(records.iter().cloned());

        Ok(records)
    }

    async fn upload_file(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, PlatformError> {
        self.pause().await;
        let mut state = self.lock();
        begin_integration(&mut state)?;
        if bytes.is_empty() {
            return Err(PlatformError::rejected("cannot upload an empty file"));
        }

        let url = format!("memory://uploads/{}/{file_name}", Ulid::new());
        state.uploads.push(url.clone());

        Ok(url)
    }

    async fn invoke_llm(&self, request: LlmRequest) -> Result<Value, PlatformError> {
        self.pause().await;
        let mut state = self.lock();
        begin_integration(&mut state)?;

        let response = state
            .llm_responses
            .pop_front()
            .unwrap_or_else(|| Value::String(format!("echo: {}", request.prompt)));
        state.llm_requests.push(request);

        Ok(response)
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, PlatformError> {
        self.pause().await;
        let mut state = self.lock();
        begin_integration(&mut state)?;
        if prompt.trim().is_empty() {
            return Err(PlatformError::rejected("image prompt is empty"));
        }

        Ok(format!("memory://images/{}.png", Ulid::new()))
    }

    async fn invoke_function(&self, name: &str, payload: Value) -> Result<Value, PlatformError> {
        self.pause().await;
        let handler = {
            let mut state = self.lock();
            begin_integration(&mut state)?;
            state.functions.get(name).cloned()
        };

        match handler {
            Some(handler) => handler(payload),
            None => Err(PlatformError::Unsupported {
                operation: format!("functions.{name}"),
            }),
        }
    }
}

fn take(counter: &mut u32) -> bool {
    if *counter == 0 {
        return false;
    }
    *counter -= 1;

    true
}

fn begin_write(state: &mut MemoryState) -> Result<(), PlatformError> {
    state.calls.writes += 1;
    if take(&mut state.faults.writes) {
        return Err(PlatformError::rejected("simulated write rejection"));
    }

    Ok(())
}

fn begin_integration(state: &mut MemoryState) -> Result<(), PlatformError> {
    state.calls.integrations += 1;
    if take(&mut state.faults.integrations) {
        return Err(PlatformError::unavailable("simulated integration outage"));
    }

    Ok(())
}

fn new_record(created_by: Option<String>, payload: Payload) -> Record {
    let created_date = OffsetDateTime::now_utc().format(&Rfc3339).ok();

    Record::from_payload(RecordId::generate(), created_by, created_date, payload)
}

fn not_found(collection: &CollectionName, id: &RecordId) -> PlatformError {
    PlatformError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{cliente, payload};
    use serde_json::json;

    #[tokio::test]
    async fn create_stamps_creator_and_date() {
        let platform = MemoryPlatform::new().with_user(cliente());
        let record = platform
            .create(&CollectionName::BOOKING, payload(json!({ "price": 80 })))
            .await
            .expect("create should succeed");

        assert_eq!(record.created_by.as_deref(), Some("cliente@example.com"));
        assert!(record.created_date.is_some());
        assert_eq!(platform.records(&CollectionName::BOOKING), vec![record]);
    }

    #[tokio::test]
    async fn filter_sort_and_limit_are_applied() {
        let platform = MemoryPlatform::new();
        platform.seed(
            &CollectionName::TRANSACTION,
            [
                payload(json!({ "type": "Receita", "amount": 10 })),
                payload(json!({ "type": "Despesa", "amount": 20 })),
                payload(json!({ "type": "Receita", "amount": 30 })),
            ],
        );

        let rows = platform
            .filter(
                &CollectionName::TRANSACTION,
                &Filter::new().field_eq("type", "Receita"),
                Some(&Sort::desc("amount")),
                Some(1),
            )
            .await
            .expect("filter should succeed");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields.get("amount"), Some(&json!(30)));
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_records() {
        let platform = MemoryPlatform::new();
        let missing = RecordId::new("nope");

        let update = platform
            .update(&CollectionName::BOOKING, &missing, Payload::new())
            .await;
        let delete = platform.delete(&CollectionName::BOOKING, &missing).await;

        assert!(matches!(update, Err(PlatformError::NotFound { .. })));
        assert!(matches!(delete, Err(PlatformError::NotFound { .. })));
    }

    #[tokio::test]
    async fn injected_faults_are_consumed_in_order() {
        let platform = MemoryPlatform::new();
        platform.fail_next_reads(1);

        let first = platform.list(&CollectionName::REVIEW, None, None).await;
        let second = platform.list(&CollectionName::REVIEW, None, None).await;

        assert!(matches!(first, Err(ref err) if err.is_transient()));
        assert_eq!(second, Ok(Vec::new()));
        assert_eq!(platform.calls().reads, 2);
    }

    #[tokio::test]
    async fn update_me_cannot_change_role() {
        let platform = MemoryPlatform::new().with_user(cliente());
        let updated = platform
            .update_me(payload(json!({ "role": "admin", "full_name": "Ana Souza" })))
            .await
            .expect("update_me should succeed");

        assert!(!updated.is_admin());
        assert_eq!(updated.full_name, "Ana Souza");
    }

    #[tokio::test]
    async fn unknown_functions_are_unsupported() {
        let platform = MemoryPlatform::new();
        platform.register_function("double", |value| {
            Ok(json!(value.as_i64().unwrap_or_default() * 2))
        });

        assert_eq!(
            platform.invoke_function("double", json!(21)).await,
            Ok(json!(42))
        );
        assert!(matches!(
            platform.invoke_function("missing", Value::Null).await,
            Err(PlatformError::Unsupported { .. })
        ));
    }
}
