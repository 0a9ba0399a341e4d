use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
///
/// User-facing error with a stable machine-readable code, the layer it came
/// from, a localized message, and optional diagnostic details.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub code: ErrorCode,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional diagnostic detail (expected vs actual, upstream message).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Error {
    pub fn new(code: ErrorCode, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            code,
            origin,
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Construct a cancellation error for the given origin.
    pub fn cancelled(origin: ErrorOrigin) -> Self {
        Self::new(ErrorCode::Cancelled, origin, "operation cancelled")
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.code, ErrorCode::Cancelled)
    }

    /// True when the user can recover by retrying the same action.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::AuthError
                | ErrorCode::ReadError
                | ErrorCode::WriteError
                | ErrorCode::ExternalServiceError
        )
    }

    #[must_use]
    pub fn display_with_code(&self) -> String {
        match &self.details {
            Some(details) => format!("{}:{}: {} ({details})", self.origin, self.code, self.message),
            None => format!("{}:{}: {}", self.origin, self.code, self.message),
        }
    }
}

///
/// ErrorCode
///
/// Stable short codes shared by gate denials and every module error.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    #[display("AUTH_ERROR")]
    AuthError,

    #[display("NO_USER")]
    NoUser,

    #[display("INSUFFICIENT_ROLE")]
    InsufficientRole,

    #[display("INSUFFICIENT_USER_TYPE")]
    InsufficientUserType,

    #[display("USER_SETUP_REQUIRED")]
    UserSetupRequired,

    #[display("READ_ERROR")]
    ReadError,

    #[display("WRITE_ERROR")]
    WriteError,

    #[display("DECODE_ERROR")]
    DecodeError,

    #[display("EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError,

    #[display("CANCELLED")]
    Cancelled,

    #[display("CONFIG_ERROR")]
    ConfigError,

    #[display("CLIENT_STATE_ERROR")]
    ClientStateError,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorOrigin {
    #[display("session")]
    Session,

    #[display("gate")]
    Gate,

    #[display("query")]
    Query,

    #[display("mutation")]
    Mutation,

    #[display("integration")]
    Integration,

    #[display("config")]
    Config,

    #[display("client_state")]
    ClientState,
}

///
/// TESTS
///
