//! Token issue/refresh/revoke and the bearer check for protected routes.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::{AppState, Session};
use crate::error::HttpError;
use crate::records::{LoginInput, LoginResponse, TokenInput};

pub const TOKEN_TTL_SECS: i64 = 3600;

fn token() -> String {
    Uuid::new_v4().simple().to_string()
}

async fn issue(state: &AppState, username: String) -> LoginResponse {
    let access_token = token();
    let refresh_token = token();
    state.sessions.write().await.insert(
        access_token.clone(),
        Session {
            username: username.clone(),
            refresh_token: refresh_token.clone(),
        },
    );
    LoginResponse {
        access_token,
        refresh_token,
        display_name: "Administrator".to_string(),
        username,
        expires_at: Utc::now() + Duration::seconds(TOKEN_TTL_SECS),
    }
}

/// Drop the session holding `refresh_token`; returns its user.
async fn revoke(state: &AppState, refresh_token: &str) -> Option<String> {
    let mut sessions = state.sessions.write().await;
    let access = sessions
        .iter()
        .find(|(_, s)| s.refresh_token == refresh_token)
        .map(|(access, _)| access.clone())?;
    sessions.remove(&access).map(|s| s.username)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    input: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<LoginResponse>, HttpError> {
    let Json(input) = input?;
    let config = &state.config;
    if input.username != config.admin_user || input.password != config.admin_password {
        debug!(username = %input.username, "rejected login");
        return Err(HttpError::new(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }
    info!(username = %input.username, "login");
    Ok(Json(issue(&state, input.username).await))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    input: Result<Json<TokenInput>, JsonRejection>,
) -> Result<Json<LoginResponse>, HttpError> {
    let Json(input) = input?;
    let username = revoke(&state, &input.refresh_token)
        .await
        .ok_or_else(HttpError::unauthorized)?;
    debug!(%username, "refreshed");
    Ok(Json(issue(&state, username).await))
}

/// Always succeeds; unknown tokens are ignored.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    input: Result<Json<TokenInput>, JsonRejection>,
) -> Result<Json<Value>, HttpError> {
    let Json(input) = input?;
    if let Some(username) = revoke(&state, &input.refresh_token).await {
        info!(%username, "logout");
    }
    Ok(Json(json!({ "message": "Logged out" })))
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned);
    let Some(token) = token else {
        return Err(HttpError::unauthorized());
    };
    if !state.sessions.read().await.contains_key(&token) {
        return Err(HttpError::unauthorized());
    }
    Ok(next.run(request).await)
}
