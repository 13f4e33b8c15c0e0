//! Client configuration.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin, without the `/api` prefix.
    pub base_url: String,
    /// Where the session is persisted. `None` keeps it in memory only.
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_file: None,
        }
    }
}

impl ClientConfig {
    /// Read `FOLIO_API_URL` and `FOLIO_SESSION_FILE`, falling back to the
    /// defaults for unset or blank values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            base_url: non_blank("FOLIO_API_URL").unwrap_or(defaults.base_url),
            session_file: non_blank("FOLIO_SESSION_FILE").map(PathBuf::from),
        }
    }
}
