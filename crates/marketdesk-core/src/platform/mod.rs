//! Port to the hosted backend platform (auth, entity CRUD, integrations).
//!
//! The platform owns every record; this crate only reads through it and
//! writes through it. `memory` provides a complete in-process platform.

mod error;
pub mod memory;

pub use error::PlatformError;

use crate::{
    entity::{CollectionName, Filter, Payload, Record, RecordId, Sort},
    session::SessionUser,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

///
/// LlmRequest
///
/// Parameters for the platform's language-model integration.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct LlmRequest {
    pub prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_json_schema: Option<Value>,

    #[serde(default)]
    pub add_context_from_internet: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_urls: Vec<String>,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.response_json_schema = Some(schema);
        self
    }
}

///
/// Platform
///
/// Every call is a network round-trip that may fail with a human-readable
/// message. Callers race these futures against their cancellation token.
///

#[async_trait]
pub trait Platform: Send + Sync {
    //
    // Auth
    //

    /// Current user, or `None` when nobody is signed in.
    async fn me(&self) -> Result<Option<SessionUser>, PlatformError>;

    async fn logout(&self) -> Result<(), PlatformError>;

    async fn update_me(&self, patch: Payload) -> Result<SessionUser, PlatformError>;

    //
    // Entities
    //

    async fn list(
        &self,
        collection: &CollectionName,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, PlatformError>;

    async fn filter(
        &self,
        collection: &CollectionName,
        filter: &Filter,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, PlatformError>;

    async fn create(
        &self,
        collection: &CollectionName,
        payload: Payload,
    ) -> Result<Record, PlatformError>;

    async fn update(
        &self,
        collection: &CollectionName,
        id: &RecordId,
        patch: Payload,
    ) -> Result<Record, PlatformError>;

    async fn delete(&self, collection: &CollectionName, id: &RecordId)
    -> Result<(), PlatformError>;

    async fn bulk_create(
        &self,
        collection: &CollectionName,
        payloads: Vec<Payload>,
    ) -> Result<Vec<Record>, PlatformError>;

    //
    // Integrations
    //

    /// Upload a file and return its public URL.
    async fn upload_file(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, PlatformError>;

    async fn invoke_llm(&self, request: LlmRequest) -> Result<Value, PlatformError>;

    /// Generate an image and return its URL.
    async fn generate_image(&self, prompt: &str) -> Result<String, PlatformError>;

    /// Invoke a named backend function.
    async fn invoke_function(&self, name: &str, payload: Value) -> Result<Value, PlatformError>;
}
