//! The result envelope every asynchronous operation resolves into.
//!
//! # Design
//! A repository call is a stream of at most two `Resource` values: `Loading`,
//! then one terminal `Success` or `Error`. `emit` builds that stream as
//! `once(Loading).chain(once(call))`, so the ordering and the two-item bound
//! hold by construction rather than by discipline in each repository.
//!
//! `ApiError` never leaves this module as an error: it is folded into
//! `Resource::Error` with the mapping below.
//!
//! | failure                  | `message`                                  | `code`        |
//! |--------------------------|--------------------------------------------|---------------|
//! | HTTP status              | server message, else `"HTTP {status}"`     | `Some(status)`|
//! | transport / codec / store| fault description, else `"Unknown error"`  | `None`        |

use std::future::Future;

use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use tracing::{debug, warn};

use crate::error::ApiError;

/// Fallback message for faults that carry no description.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Loading / success / error state of one asynchronous operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource<T> {
    Loading,
    Success(T),
    Error { message: String, code: Option<u16> },
}

/// The stream type returned by every repository operation.
pub type ResourceStream<T> = BoxStream<'static, Resource<T>>;

impl<T> Resource<T> {
    pub fn error(message: impl Into<String>, code: Option<u16>) -> Self {
        Resource::Error {
            message: message.into(),
            code,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_success(self) -> Option<T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Resource::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<u16> {
        match self {
            Resource::Error { code, .. } => *code,
            _ => None,
        }
    }

    /// Whether the same call might succeed if the user tries again: no
    /// response at all, a timeout, throttling, or a server-side failure.
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Resource::Error { code: None, .. } => true,
            Resource::Error {
                code: Some(code), ..
            } => matches!(code, 408 | 429 | 500..=599),
            _ => false,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resource<U> {
        match self {
            Resource::Loading => Resource::Loading,
            Resource::Success(data) => Resource::Success(f(data)),
            Resource::Error { message, code } => Resource::Error { message, code },
        }
    }
}

impl<T> From<ApiError> for Resource<T> {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http { status, message } => {
                let message = message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| format!("HTTP {status}"));
                Resource::Error {
                    message,
                    code: Some(status),
                }
            }
            ApiError::Transport(desc) => Resource::Error {
                message: describe(desc),
                code: None,
            },
            other => Resource::Error {
                message: describe(other.to_string()),
                code: None,
            },
        }
    }
}

fn describe(desc: String) -> String {
    if desc.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        desc
    }
}

/// Wrap `call` in the Loading-then-terminal stream.
///
/// `call` is not polled until the consumer has taken `Loading`.
pub fn emit<T, F>(op: &'static str, call: F) -> ResourceStream<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    stream::once(future::ready(Resource::Loading))
        .chain(stream::once(async move {
            match call.await {
                Ok(data) => Resource::Success(data),
                Err(err) => {
                    let resource = Resource::from(err);
                    if let Resource::Error { message, code } = &resource {
                        warn!(op, ?code, %message, "operation failed");
                    }
                    resource
                }
            }
        }))
        .boxed()
}

/// Drive `stream` to its terminal state.
///
/// Returns `None` only if the stream ends without one, which repository
/// streams never do.
pub async fn settle<T>(mut stream: ResourceStream<T>) -> Option<Resource<T>> {
    let mut last = None;
    while let Some(item) = stream.next().await {
        last = Some(item);
    }
    last.filter(Resource::is_terminal)
}

/// Drive a side-effecting call to completion and discard the outcome.
///
/// Used for reads whose primary action already succeeded (mark-as-read): a
/// failure is logged and otherwise dropped.
pub async fn best_effort<T>(op: &'static str, stream: ResourceStream<T>) {
    if let Some(Resource::Error { message, code }) = settle(stream).await {
        debug!(op, ?code, %message, "best-effort call failed; ignored");
    }
}
