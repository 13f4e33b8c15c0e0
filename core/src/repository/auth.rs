//! Login, logout and token refresh.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::Context;
use crate::dto::{LoginRequest, LoginResponseDto, TokenRequest};
use crate::envelope::{emit, ResourceStream};
use crate::error::ApiError;
use crate::model::UserSession;
use crate::session::{session_from_login, SessionStore};
use crate::validate::{Validate, ValidationError};

#[derive(Clone)]
pub struct AuthRepository {
    ctx: Arc<Context>,
}

impl AuthRepository {
    pub(crate) fn new(ctx: Arc<Context>) -> Self {
        Self { ctx }
    }

    /// Authenticate and persist the session.
    ///
    /// Blank credentials are rejected before anything is sent. A failed
    /// login, including one whose session cannot be persisted, leaves
    /// whatever session was stored before untouched.
    pub fn login(
        &self,
        credentials: LoginRequest,
    ) -> Result<ResourceStream<UserSession>, ValidationError> {
        credentials.validate()?;
        let ctx = self.ctx.clone();
        Ok(emit("login", async move {
            let request = ctx.client.build_login(&credentials)?;
            let response = ctx.send_anonymous(request).await?;
            let dto: LoginResponseDto = ctx.client.parse_json(response)?;
            let session = session_from_login(dto, Utc::now());
            ctx.session.save(&session)?;
            info!(username = %session.username, expires_at = %session.expires_at, "logged in");
            Ok(session)
        }))
    }

    /// Exchange the stored refresh token for a new session.
    ///
    /// The token is read when the stream is first polled, so a logout in
    /// between yields the local 401 instead of sending a revoked token.
    pub fn refresh(&self) -> ResourceStream<UserSession> {
        let ctx = self.ctx.clone();
        emit("refresh", async move {
            let refresh_token = ctx.session.refresh_token().ok_or_else(|| ApiError::Http {
                status: 401,
                message: Some("Not logged in".to_string()),
            })?;
            let request = ctx.client.build_refresh(&TokenRequest { refresh_token })?;
            let response = ctx.send_anonymous(request).await?;
            let dto: LoginResponseDto = ctx.client.parse_json(response)?;
            let session = session_from_login(dto, Utc::now());
            ctx.session.save(&session)?;
            debug!(expires_at = %session.expires_at, "session refreshed");
            Ok(session)
        })
    }

    /// End the session. Never fails from the caller's point of view.
    ///
    /// The server call is skipped when no refresh token is stored, and any
    /// error from it is swallowed. The local store is cleared afterwards in
    /// every case, including when this future is dropped mid-flight.
    pub async fn logout(&self) {
        let _clear = ClearOnDrop(&self.ctx.session);
        let Some(refresh_token) = self.ctx.session.refresh_token() else {
            debug!("no refresh token stored; skipping server logout");
            return;
        };
        let ctx = &self.ctx;
        let result = async {
            let request = ctx.client.build_logout(&TokenRequest { refresh_token })?;
            let response = ctx.send(request).await?;
            ctx.client.parse_ack(response)
        }
        .await;
        if let Err(err) = result {
            debug!(error = %err, "server logout failed; ignored");
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.ctx.session.is_logged_in()
    }

    pub fn logged_in(&self) -> watch::Receiver<bool> {
        self.ctx.session.logged_in()
    }

    pub fn current_session(&self) -> Option<UserSession> {
        self.ctx.session.current()
    }
}

struct ClearOnDrop<'a>(&'a SessionStore);

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        match self.0.clear() {
            Ok(()) => info!("logged out"),
            Err(err) => warn!(error = %err, "failed to clear session store"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::envelope::Resource;
    use crate::repository::test_support::{
        collect, context, context_with_store, ScriptedTransport,
    };

    const LOGIN_OK: &str = r#"{
        "accessToken": "acc-1",
        "refreshToken": "ref-1",
        "username": "admin",
        "displayName": "Site Admin",
        "expiresAt": "2030-01-01T00:00:00Z"
    }"#;

    fn credentials() -> LoginRequest {
        LoginRequest {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        }
    }

    fn auth(transport: &Arc<ScriptedTransport>) -> (AuthRepository, Arc<SessionStore>) {
        let (ctx, session) = context(transport.clone());
        (AuthRepository::new(ctx), session)
    }

    async fn logged_in(transport: &Arc<ScriptedTransport>) -> (AuthRepository, Arc<SessionStore>) {
        transport.reply(200, LOGIN_OK);
        let (repo, session) = auth(transport);
        collect(repo.login(credentials()).unwrap()).await;
        assert!(session.is_logged_in());
        (repo, session)
    }

    #[tokio::test]
    async fn login_persists_session() {
        let transport = Arc::new(ScriptedTransport::default()).reply(200, LOGIN_OK);
        let (repo, session) = auth(&transport);
        let mut signal = repo.logged_in();

        let states = collect(repo.login(credentials()).unwrap()).await;
        assert!(states[0].is_loading());
        let user = states[1].success().unwrap();
        assert_eq!(user.display_name, "Site Admin");
        assert_eq!(session.access_token().as_deref(), Some("acc-1"));
        assert!(signal.has_changed().unwrap());
        assert!(*signal.borrow_and_update());

        let sent = &transport.requests()[0];
        assert_eq!(sent.path, "http://folio.test/api/auth/login");
        assert!(sent.header("authorization").is_none());
    }

    #[tokio::test]
    async fn login_with_unparseable_expiry_defaults_to_one_hour() {
        let transport = Arc::new(ScriptedTransport::default()).reply(
            200,
            r#"{"accessToken":"a","refreshToken":"r","username":"admin","expiresAt":"soon"}"#,
        );
        let (repo, session) = auth(&transport);
        let before = Utc::now();
        let states = collect(repo.login(credentials()).unwrap()).await;
        let after = Utc::now();

        let user = states[1].success().unwrap();
        assert!(user.expires_at >= before + Duration::milliseconds(3_600_000));
        assert!(user.expires_at <= after + Duration::milliseconds(3_600_000));
        assert_eq!(session.current().unwrap().expires_at, user.expires_at);
    }

    #[tokio::test]
    async fn failed_login_keeps_previous_session() {
        let transport = Arc::new(ScriptedTransport::default());
        let (repo, session) = logged_in(&transport).await;

        transport.reply(401, r#"{"message":"Invalid credentials"}"#);
        let states = collect(repo.login(credentials()).unwrap()).await;
        assert_eq!(
            states[1],
            Resource::error("Invalid credentials", Some(401))
        );
        assert_eq!(session.access_token().as_deref(), Some("acc-1"));
    }

    #[tokio::test]
    async fn blank_credentials_never_reach_the_server() {
        let transport = Arc::new(ScriptedTransport::default());
        let (repo, session) = auth(&transport);
        let err = repo
            .login(LoginRequest {
                username: " ".to_string(),
                password: "admin123".to_string(),
            })
            .err()
            .unwrap();
        assert_eq!(err.field, "username");
        assert!(transport.requests().is_empty());
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn unpersistable_login_keeps_previous_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let kv = Arc::new(crate::store::JsonFileStore::open(&path).unwrap());
        let transport = Arc::new(ScriptedTransport::default()).reply(200, LOGIN_OK);
        let (ctx, session) = context_with_store(transport.clone(), kv);
        let repo = AuthRepository::new(ctx);
        collect(repo.login(credentials()).unwrap()).await;
        let before = session.current().unwrap();

        std::fs::create_dir(path.with_extension("tmp")).unwrap();
        transport.reply(
            200,
            r#"{"accessToken":"acc-2","refreshToken":"ref-2","username":"admin"}"#,
        );
        let mut signal = repo.logged_in();
        let states = collect(repo.login(credentials()).unwrap()).await;

        assert_eq!(states.len(), 2);
        assert!(states[1].error_message().unwrap().contains("Is a directory"));
        assert_eq!(states[1].error_code(), None);
        assert_eq!(session.current(), Some(before));
        assert!(!signal.has_changed().unwrap());
        assert!(session.is_logged_in());
    }

    #[tokio::test]
    async fn logout_clears_after_server_success() {
        let transport = Arc::new(ScriptedTransport::default());
        let (repo, session) = logged_in(&transport).await;
        transport.reply(200, r#"{"message":"logged out"}"#);

        repo.logout().await;
        assert!(!session.is_logged_in());
        assert!(session.current().is_none());

        let sent = transport.requests().pop().unwrap();
        assert_eq!(sent.path, "http://folio.test/api/auth/logout");
        assert!(sent.body_str().unwrap().contains("\"refreshToken\":\"ref-1\""));
    }

    #[tokio::test]
    async fn logout_clears_after_http_error() {
        let transport = Arc::new(ScriptedTransport::default());
        let (repo, session) = logged_in(&transport).await;
        transport.reply(500, "");

        repo.logout().await;
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn logout_clears_after_transport_error() {
        let transport = Arc::new(ScriptedTransport::default());
        let (repo, session) = logged_in(&transport).await;
        transport.fault("connection reset");

        repo.logout().await;
        assert!(!session.is_logged_in());
        assert!(session.refresh_token().is_none());
    }

    #[tokio::test]
    async fn logout_without_refresh_token_skips_server() {
        let transport = Arc::new(ScriptedTransport::default());
        let (repo, session) = auth(&transport);

        repo.logout().await;
        assert!(transport.requests().is_empty());
        assert!(!session.is_logged_in());
    }

    struct Stalled;

    #[async_trait::async_trait]
    impl crate::transport::Transport for Stalled {
        async fn execute(
            &self,
            _request: crate::http::HttpRequest,
        ) -> Result<crate::http::HttpResponse, ApiError> {
            futures::future::pending().await
        }
    }

    #[tokio::test]
    async fn cancelled_logout_still_clears() {
        let (ctx, session) = context(Arc::new(Stalled));
        session
            .save(&UserSession {
                access_token: "acc".to_string(),
                refresh_token: "ref".to_string(),
                username: "admin".to_string(),
                display_name: "Admin".to_string(),
                expires_at: Utc::now(),
            })
            .unwrap();
        let repo = AuthRepository::new(ctx);

        let mut fut = Box::pin(repo.logout());
        assert!(futures::poll!(&mut fut).is_pending());
        assert!(session.is_logged_in());
        drop(fut);
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn refresh_without_token_fails_locally() {
        let transport = Arc::new(ScriptedTransport::default());
        let (repo, _) = auth(&transport);
        let states = collect(repo.refresh()).await;
        assert_eq!(states[0], Resource::Loading);
        assert_eq!(states[1].error_code(), Some(401));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn refresh_reads_token_when_polled() {
        let transport = Arc::new(ScriptedTransport::default());
        let (repo, session) = logged_in(&transport).await;
        let sent_before = transport.requests().len();

        let pending = repo.refresh();
        session.clear().unwrap();
        let states = collect(pending).await;

        assert_eq!(states[1].error_code(), Some(401));
        assert_eq!(states[1].error_message(), Some("Not logged in"));
        assert_eq!(transport.requests().len(), sent_before);
    }

    #[tokio::test]
    async fn refresh_sends_token_stored_at_poll_time() {
        let transport = Arc::new(ScriptedTransport::default());
        let (repo, session) = logged_in(&transport).await;

        let pending = repo.refresh();
        let mut rotated = session.current().unwrap();
        rotated.refresh_token = "ref-rotated".to_string();
        session.save(&rotated).unwrap();
        transport.reply(
            200,
            r#"{"accessToken":"acc-3","refreshToken":"ref-3","username":"admin"}"#,
        );
        collect(pending).await;

        let sent = transport.requests().pop().unwrap();
        assert!(sent.body_str().unwrap().contains("\"refreshToken\":\"ref-rotated\""));
    }

    #[tokio::test]
    async fn refresh_replaces_tokens() {
        let transport = Arc::new(ScriptedTransport::default());
        let (repo, session) = logged_in(&transport).await;
        transport.reply(
            200,
            r#"{"accessToken":"acc-2","refreshToken":"ref-2","username":"admin"}"#,
        );
        let states = collect(repo.refresh()).await;
        assert!(states[1].success().is_some());
        assert_eq!(session.access_token().as_deref(), Some("acc-2"));
        assert_eq!(session.refresh_token().as_deref(), Some("ref-2"));
    }
}
