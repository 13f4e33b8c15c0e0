//! Session tokens and theme preference, on top of a `KeyValueStore`.
//!
//! # Design
//! `SessionStore` is the only state shared across screens. It is injected
//! into every consumer (auth flows, the bearer-header step) rather than held
//! in a global. `logged_in()` is a `watch` signal derived from "a non-empty
//! access token is stored"; expiry is informational and never consulted.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::dto::LoginResponseDto;
use crate::model::{parse_timestamp, UserSession};
use crate::store::{KeyValueStore, StoreError};

const ACCESS_TOKEN: &str = "access_token";
const REFRESH_TOKEN: &str = "refresh_token";
const USERNAME: &str = "username";
const DISPLAY_NAME: &str = "display_name";
const EXPIRES_AT: &str = "expires_at";
const THEME: &str = "theme";

const SESSION_KEYS: [&str; 5] = [ACCESS_TOKEN, REFRESH_TOKEN, USERNAME, DISPLAY_NAME, EXPIRES_AT];

/// Lifetime (ms) assumed for a session whose expiry the server did not state
/// legibly.
pub const FALLBACK_SESSION_TTL_MS: i64 = 3_600_000;

/// Derive the persisted session from a login/refresh body.
///
/// `expiresAt` may be RFC 3339, a naive ISO-8601 date-time (UTC), or epoch
/// milliseconds. Anything else, including a missing value, yields
/// `now + 1h` so a malformed expiry is never treated as already expired.
pub fn session_from_login(dto: LoginResponseDto, now: DateTime<Utc>) -> UserSession {
    let expires_at = dto
        .expires_at
        .as_ref()
        .and_then(parse_expiry)
        .unwrap_or_else(|| now + Duration::milliseconds(FALLBACK_SESSION_TTL_MS));
    let display_name = dto
        .display_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| dto.username.clone());
    UserSession {
        access_token: dto.access_token,
        refresh_token: dto.refresh_token,
        username: dto.username,
        display_name,
        expires_at,
    }
}

fn parse_expiry(raw: &serde_json::Value) -> Option<DateTime<Utc>> {
    match raw {
        serde_json::Value::String(s) => parse_timestamp(s),
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
    logged_in: watch::Sender<bool>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let initial = has_token(kv.get(ACCESS_TOKEN));
        let (logged_in, _) = watch::channel(initial);
        Self { kv, logged_in }
    }

    /// The stored session, if every required key is present.
    pub fn current(&self) -> Option<UserSession> {
        let access_token = self.access_token()?;
        let refresh_token = self.kv.get(REFRESH_TOKEN).unwrap_or_default();
        let username = self.kv.get(USERNAME).unwrap_or_default();
        let display_name = self
            .kv
            .get(DISPLAY_NAME)
            .unwrap_or_else(|| username.clone());
        let expires_at = self
            .kv
            .get(EXPIRES_AT)
            .as_deref()
            .and_then(parse_timestamp)?;
        Some(UserSession {
            access_token,
            refresh_token,
            username,
            display_name,
            expires_at,
        })
    }

    /// Non-empty stored access token.
    pub fn access_token(&self) -> Option<String> {
        self.kv.get(ACCESS_TOKEN).filter(|t| !t.is_empty())
    }

    /// Non-empty stored refresh token.
    pub fn refresh_token(&self) -> Option<String> {
        self.kv.get(REFRESH_TOKEN).filter(|t| !t.is_empty())
    }

    pub fn is_logged_in(&self) -> bool {
        *self.logged_in.borrow()
    }

    /// Observable logged-in flag.
    pub fn logged_in(&self) -> watch::Receiver<bool> {
        self.logged_in.subscribe()
    }

    /// Replace the stored session as one write. On `Err` the previous
    /// session is still the stored one.
    pub fn save(&self, session: &UserSession) -> Result<(), StoreError> {
        let expires_at = session.expires_at.to_rfc3339();
        let result = self.kv.set_many(&[
            (ACCESS_TOKEN, session.access_token.as_str()),
            (REFRESH_TOKEN, session.refresh_token.as_str()),
            (USERNAME, session.username.as_str()),
            (DISPLAY_NAME, session.display_name.as_str()),
            (EXPIRES_AT, expires_at.as_str()),
        ]);
        self.publish();
        result
    }

    /// Forget every session key. The keys are gone and the logged-in signal
    /// drops even when the store cannot persist the removal; that failure is
    /// still returned.
    pub fn clear(&self) -> Result<(), StoreError> {
        let result = self.kv.remove_many(&SESSION_KEYS);
        self.publish();
        result
    }

    fn publish(&self) {
        let now = has_token(self.kv.get(ACCESS_TOKEN));
        self.logged_in.send_if_modified(|current| {
            let changed = *current != now;
            *current = now;
            changed
        });
    }
}

fn has_token(token: Option<String>) -> bool {
    token.is_some_and(|t| !t.is_empty())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    System,
    Light,
    Dark,
}

impl ThemePreference {
    fn as_str(self) -> &'static str {
        match self {
            ThemePreference::System => "system",
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "system" => Some(ThemePreference::System),
            "light" => Some(ThemePreference::Light),
            "dark" => Some(ThemePreference::Dark),
            _ => None,
        }
    }
}

/// Theme preference, stored next to the session but never cleared by
/// logout.
pub struct ThemeStore {
    kv: Arc<dyn KeyValueStore>,
    current: watch::Sender<ThemePreference>,
}

impl ThemeStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let initial = kv
            .get(THEME)
            .as_deref()
            .and_then(ThemePreference::parse)
            .unwrap_or_default();
        let (current, _) = watch::channel(initial);
        Self { kv, current }
    }

    pub fn get(&self) -> ThemePreference {
        *self.current.borrow()
    }

    pub fn set(&self, theme: ThemePreference) -> Result<(), StoreError> {
        self.kv.set(THEME, theme.as_str())?;
        self.current.send_replace(theme);
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemePreference> {
        self.current.subscribe()
    }
}
