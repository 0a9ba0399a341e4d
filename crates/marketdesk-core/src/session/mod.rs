//! Session access: who is signed in, fetched once and shared.

mod accessor;
mod user;

pub use accessor::SessionAccessor;
pub use user::{Role, SessionUser, UserType};

use crate::{
    error::{Error, ErrorCode, ErrorOrigin},
    platform::PlatformError,
};
use thiserror::Error as ThisError;

///
/// SessionError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SessionError {
    #[error("session fetch failed after {attempts} attempt(s): {source}")]
    Fetch {
        attempts: u32,
        #[source]
        source: PlatformError,
    },

    #[error("profile update failed: {source}")]
    Update {
        #[source]
        source: PlatformError,
    },

    #[error("logout failed: {source}")]
    Logout {
        #[source]
        source: PlatformError,
    },

    #[error("user type '{0}' cannot be chosen during setup")]
    InvalidUserType(UserType),

    #[error("session request cancelled")]
    Cancelled,
}

impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        match &err {
            SessionError::Fetch { source, .. } => Self::new(
                ErrorCode::AuthError,
                ErrorOrigin::Session,
                "Não foi possível verificar sua sessão.",
            )
            .with_details(source.to_string()),

            SessionError::Update { source } => Self::new(
                ErrorCode::WriteError,
                ErrorOrigin::Session,
                "Não foi possível atualizar seu perfil.",
            )
            .with_details(source.to_string()),

            SessionError::Logout { source } => Self::new(
                ErrorCode::AuthError,
                ErrorOrigin::Session,
                "Não foi possível encerrar sua sessão.",
            )
            .with_details(source.to_string()),

            SessionError::InvalidUserType(_) => Self::new(
                ErrorCode::WriteError,
                ErrorOrigin::Session,
                "Escolha cliente ou prestador.",
            )
            .with_details(err.to_string()),

            SessionError::Cancelled => Self::cancelled(ErrorOrigin::Session),
        }
    }
}

///
/// SessionStatus
///
/// Non-blocking view of the session, as the permission gate consumes it.
/// `Checking` covers both "never fetched" and "fetch in flight".
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum SessionStatus {
    #[default]
    Checking,
    Failed(SessionError),
    Ready(Option<SessionUser>),
}

impl SessionStatus {
    #[must_use]
    pub const fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::Ready(Some(user)) => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_checking(&self) -> bool {
        matches!(self, Self::Checking)
    }
}

impl From<Result<Option<SessionUser>, SessionError>> for SessionStatus {
    fn from(result: Result<Option<SessionUser>, SessionError>) -> Self {
        match result {
            Ok(user) => Self::Ready(user),
            Err(SessionError::Cancelled) => Self::Checking,
            Err(err) => Self::Failed(err),
        }
    }
}
