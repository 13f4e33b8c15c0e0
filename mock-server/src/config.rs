use std::env;

use tracing::warn;

pub const DEFAULT_UPLOAD_LIMIT: usize = 5 * 1024 * 1024;

/// Runtime knobs for the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    pub admin_user: String,
    pub admin_password: String,
    /// Largest accepted upload body in bytes; larger uploads get 413.
    pub upload_limit: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            admin_user: "admin".to_string(),
            admin_password: "admin123".to_string(),
            upload_limit: DEFAULT_UPLOAD_LIMIT,
        }
    }
}

impl MockConfig {
    /// Read `MOCK_ADMIN_USER`, `MOCK_ADMIN_PASSWORD` and `MOCK_UPLOAD_LIMIT`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let upload_limit = match env::var("MOCK_UPLOAD_LIMIT") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "MOCK_UPLOAD_LIMIT is not a byte count; using default");
                defaults.upload_limit
            }),
            Err(_) => defaults.upload_limit,
        };
        Self {
            admin_user: env::var("MOCK_ADMIN_USER").unwrap_or(defaults.admin_user),
            admin_password: env::var("MOCK_ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
            upload_limit,
        }
    }
}
