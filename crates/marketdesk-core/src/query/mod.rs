//! Entity query/mutation layer.
//!
//! Reads go through the shared `QueryCache` and are retried on transient
//! platform failures. Writes are never retried; a successful write marks
//! every cached read of its collection stale. Concurrent writes are not
//! serialized here: the platform applies them last-write-wins.

mod client;
mod response;

pub use client::EntityClient;
pub use response::QueryResponse;

use crate::{
    entity::{CollectionName, MutationKind},
    error::{Error, ErrorCode, ErrorOrigin},
    platform::PlatformError,
    retry::RetryPolicy,
};
use std::time::Duration;
use thiserror::Error as ThisError;

///
/// QueryOptions
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct QueryOptions {
    /// Retry policy for reads. Writes ignore it.
    pub retry: RetryPolicy,

    /// Age after which a cached read is refetched; `None` keeps it until a write.
    pub stale_after: Option<Duration>,
}

///
/// QueryError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("reading {collection} failed after {attempts} attempt(s): {source}")]
    Fetch {
        collection: CollectionName,
        attempts: u32,
        #[source]
        source: PlatformError,
    },

    #[error("record in {collection} could not be decoded: {message}")]
    Decode {
        collection: CollectionName,
        message: String,
    },

    #[error("query cancelled")]
    Cancelled,
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        match &err {
            QueryError::Fetch { .. } => Self::new(
                ErrorCode::ReadError,
                ErrorOrigin::Query,
                "Não foi possível carregar os dados.",
            )
            .with_details(err.to_string()),

            QueryError::Decode { .. } => Self::new(
                ErrorCode::DecodeError,
                ErrorOrigin::Query,
                "Os dados recebidos estão em um formato inesperado.",
            )
            .with_details(err.to_string()),

            QueryError::Cancelled => Self::cancelled(ErrorOrigin::Query),
        }
    }
}

///
/// WriteError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum WriteError {
    #[error("{kind} on {collection} failed: {source}")]
    Rejected {
        collection: CollectionName,
        kind: MutationKind,
        #[source]
        source: PlatformError,
    },

    #[error("payload for {collection} could not be encoded: {message}")]
    Encode {
        collection: CollectionName,
        message: String,
    },

    #[error("record written to {collection} could not be decoded: {message}")]
    Decode {
        collection: CollectionName,
        message: String,
    },

    #[error("write cancelled")]
    Cancelled,
}

impl From<WriteError> for Error {
    fn from(err: WriteError) -> Self {
        match &err {
            WriteError::Rejected { source, .. } => Self::new(
                ErrorCode::WriteError,
                ErrorOrigin::Mutation,
                "Não foi possível salvar. Tente novamente.",
            )
            .with_details(source.to_string()),

            WriteError::Encode { .. } => Self::new(
                ErrorCode::WriteError,
                ErrorOrigin::Mutation,
                "Não foi possível salvar. Verifique os dados informados.",
            )
            .with_details(err.to_string()),

            WriteError::Decode { .. } => Self::new(
                ErrorCode::DecodeError,
                ErrorOrigin::Mutation,
                "Os dados salvos estão em um formato inesperado.",
            )
            .with_details(err.to_string()),

            WriteError::Cancelled => Self::cancelled(ErrorOrigin::Mutation),
        }
    }
}

///
/// TESTS
///
