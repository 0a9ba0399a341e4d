//! Platform integrations: file upload, language model, image generation, and
//! named backend functions. Failures are user-recoverable and never retried
//! automatically.

use crate::{
    error::{Error, ErrorCode, ErrorOrigin},
    platform::{LlmRequest, Platform, PlatformError},
    retry::cancellable,
};
use derive_more::Display;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{future::Future, sync::Arc};
use thiserror::Error as ThisError;
use tokio_util::sync::CancellationToken;

///
/// ExternalService
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum ExternalService {
    #[display("upload_file")]
    UploadFile,

    #[display("invoke_llm")]
    InvokeLlm,

    #[display("generate_image")]
    GenerateImage,

    #[display("function")]
    Function,
}

///
/// ExternalServiceError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ExternalServiceError {
    #[error("{service} failed: {source}")]
    Failed {
        service: ExternalService,
        #[source]
        source: PlatformError,
    },

    #[error("{service} returned an unexpected response: {message}")]
    Decode {
        service: ExternalService,
        message: String,
    },

    #[error("{service} cancelled")]
    Cancelled { service: ExternalService },
}

impl From<ExternalServiceError> for Error {
    fn from(err: ExternalServiceError) -> Self {
        match &err {
            ExternalServiceError::Failed { service, .. }
            | ExternalServiceError::Decode { service, .. } => Self::new(
                ErrorCode::ExternalServiceError,
                ErrorOrigin::Integration,
                message_for(*service),
            )
            .with_details(err.to_string()),

            ExternalServiceError::Cancelled { .. } => Self::cancelled(ErrorOrigin::Integration),
        }
    }
}

const fn message_for(service: ExternalService) -> &'static str {
    match service {
        ExternalService::UploadFile => "Não foi possível enviar o arquivo. Tente novamente.",
        ExternalService::InvokeLlm => "O assistente não respondeu. Tente novamente.",
        ExternalService::GenerateImage => "Não foi possível gerar a imagem. Tente novamente.",
        ExternalService::Function => "O serviço não respondeu. Tente novamente.",
    }
}

///
/// Integrations
///

#[derive(Clone)]
pub struct Integrations {
    platform: Arc<dyn Platform>,
}

impl Integrations {
    #[must_use]
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    /// Upload a file; returns its public URL.
    pub async fn upload_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        cancel: &CancellationToken,
    ) -> Result<String, ExternalServiceError> {
        call(
            ExternalService::UploadFile,
            cancel,
            self.platform.upload_file(file_name, bytes),
        )
        .await
    }

    pub async fn invoke_llm(
        &self,
        request: LlmRequest,
        cancel: &CancellationToken,
    ) -> Result<Value, ExternalServiceError> {
        call(
            ExternalService::InvokeLlm,
            cancel,
            self.platform.invoke_llm(request),
        )
        .await
    }

    /// Invoke the model with a response schema and decode its answer.
    pub async fn invoke_llm_as<T: DeserializeOwned>(
        &self,
        request: LlmRequest,
        cancel: &CancellationToken,
    ) -> Result<T, ExternalServiceError> {
        let value = self.invoke_llm(request, cancel).await?;

        serde_json::from_value(value).map_err(|err| ExternalServiceError::Decode {
            service: ExternalService::InvokeLlm,
            message: err.to_string(),
        })
    }

    /// Generate an image; returns its URL.
    pub async fn generate_image(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ExternalServiceError> {
        call(
            ExternalService::GenerateImage,
            cancel,
            self.platform.generate_image(prompt),
        )
        .await
    }

    pub async fn invoke_function(
        &self,
        name: &str,
        payload: Value,
        cancel: &CancellationToken,
    ) -> Result<Value, ExternalServiceError> {
        tracing::debug!(function = name, "integration.function");
        call(
            ExternalService::Function,
            cancel,
            self.platform.invoke_function(name, payload),
        )
        .await
    }
}

async fn call<T>(
    service: ExternalService,
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, PlatformError>>,
) -> Result<T, ExternalServiceError> {
    if cancel.is_cancelled() {
        return Err(ExternalServiceError::Cancelled { service });
    }

    match cancellable(cancel, fut).await {
        None => Err(ExternalServiceError::Cancelled { service }),
        Some(Ok(value)) => {
            tracing::debug!(%service, "integration.ok");
            Ok(value)
        }
        Some(Err(source)) => {
            tracing::warn!(%service, error = %source, "integration failed");
            Err(ExternalServiceError::Failed { service, source })
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::memory::MemoryPlatform;
    use serde::Deserialize;
    use serde_json::json;

    fn setup() -> (Arc<MemoryPlatform>, Integrations) {
        let platform = Arc::new(MemoryPlatform::new());
        let integrations = Integrations::new(platform.clone());

        (platform, integrations)
    }

    #[tokio::test]
    async fn upload_returns_a_url() {
        let (platform, integrations) = setup();

        let url = integrations
            .upload_file("foto.png", vec![1, 2, 3], &CancellationToken::new())
            .await
            .expect("upload should succeed");

        assert!(url.ends_with("/foto.png"));
        assert_eq!(platform.uploads(), vec![url]);
    }

    #[tokio::test]
    async fn structured_llm_responses_decode() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Suggestion {
            title: String,
            price: f64,
        }

        let (platform, integrations) = setup();
        platform.script_llm_response(json!({ "title": "Pintura", "price": 250.0 }));
        let request = LlmRequest::new("sugira um serviço").with_schema(json!({ "type": "object" }));

        let suggestion: Suggestion = integrations
            .invoke_llm_as(request.clone(), &CancellationToken::new())
            .await
            .expect("decode should succeed");

        assert_eq!(suggestion.title, "Pintura");
        assert_eq!(platform.llm_requests(), vec![request]);
    }

    #[tokio::test]
    async fn mismatched_llm_response_is_a_decode_error() {
        let (platform, integrations) = setup();
        platform.script_llm_response(json!("texto livre"));

        let result: Result<Vec<String>, _> = integrations
            .invoke_llm_as(LlmRequest::new("liste"), &CancellationToken::new())
            .await;

        let err: Error = result.expect_err("should not decode").into();
        assert_eq!(err.code, ErrorCode::ExternalServiceError);
    }

    #[tokio::test]
    async fn failures_are_not_retried() {
        let (platform, integrations) = setup();
        platform.fail_next_integrations(1);

        let result = integrations
            .generate_image("logo minimalista", &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(ExternalServiceError::Failed {
                service: ExternalService::GenerateImage,
                ..
            })
        ));
        assert_eq!(platform.calls().integrations, 1);

        let err: Error = result.expect_err("failure").into();
        assert!(err.is_retryable());
        assert_eq!(err.origin, ErrorOrigin::Integration);
    }

    #[tokio::test]
    async fn functions_receive_their_payload() {
        let (platform, integrations) = setup();
        platform.register_function("quote", |payload| {
            Ok(json!({ "total": payload["hours"].as_f64().unwrap_or_default() * 80.0 }))
        });

        let quote = integrations
            .invoke_function("quote", json!({ "hours": 2 }), &CancellationToken::new())
            .await;

        assert_eq!(quote, Ok(json!({ "total": 160.0 })));
    }

    #[tokio::test]
    async fn cancelled_calls_are_not_sent() {
        let (platform, integrations) = setup();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = integrations.invoke_llm(LlmRequest::new("oi"), &cancel).await;

        assert_eq!(
            result,
            Err(ExternalServiceError::Cancelled {
                service: ExternalService::InvokeLlm
            })
        );
        assert_eq!(platform.calls().integrations, 0);
    }
}
