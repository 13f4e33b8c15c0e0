//! Client core for the portfolio admin panel.
//!
//! # Overview
//! Every backend call is exposed as a stream of `Resource` values:
//! `Loading` first, then exactly one `Success` or `Error`. Screens fold that
//! stream into `ScreenState`; nothing above the repository layer ever sees an
//! `ApiError`.
//!
//! # Design
//! - `FolioClient` is stateless and never touches the network. It builds
//!   `HttpRequest` values and parses `HttpResponse` values (host-does-IO), so
//!   the same code drives the async `Transport` here and the C ABI in
//!   `folio-ffi`.
//! - Repositories pair the client with a `Transport` and the `SessionStore`
//!   and wrap each call with `envelope::emit`.
//! - Wire DTOs (`dto`) are kept apart from domain entities (`model`); the
//!   mapping fills in defaults for fields the backend omits.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod dto;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod http;
pub mod model;
pub mod repository;
pub mod session;
pub mod state;
pub mod store;
pub mod transport;
pub mod validate;

pub use api::FolioApi;
pub use client::FolioClient;
pub use config::ClientConfig;
pub use envelope::{Resource, ResourceStream};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, UploadFile};
pub use model::*;
pub use session::{SessionStore, ThemePreference, ThemeStore};
pub use state::{ScreenModel, ScreenState, Selection, View};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::Transport;
pub use validate::{Validate, ValidationError};
