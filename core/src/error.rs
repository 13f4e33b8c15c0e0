//! Error types for the folio API client.
//!
//! # Design
//! Every fault a repository can hit lands in `ApiError`. The split that
//! matters to callers is "carries an HTTP status" (`Http`) versus everything
//! else; the envelope layer maps the former to `Error { code: Some(_) }` and
//! the rest to `Error { code: None }`.

use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by `FolioClient` parse methods and by transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status. `message` is the
    /// server-provided explanation, when the body carried one.
    #[error("HTTP {status}{}", message_suffix(.message))]
    Http { status: u16, message: Option<String> },

    /// The request never produced a response (timeout, DNS, reset, ...).
    #[error("{0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The local session or preference store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl ApiError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
