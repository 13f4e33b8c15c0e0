//! Repositories: one `Resource`-emitting operation per REST endpoint.
//!
//! # Design
//! Every repository operation follows the same template: build the request
//! with `FolioClient`, attach the bearer token, execute it on the
//! `Transport`, parse and map DTO → domain, and hand the whole thing to
//! `envelope::emit`. The template is written once, in `CrudRepository`,
//! and instantiated per collection; the few endpoints outside the
//! collection shape live in the sibling modules.
//!
//! Writes validate their input first and return `Err(ValidationError)`
//! without building a stream when it is rejected. Mutations return `Ack` and
//! patch nothing locally. Callers re-run the
//! matching list/get to observe the effect.

mod auth;
mod contacts;
mod content;
mod images;
mod site;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::client::FolioClient;
use crate::endpoint::CrudEndpoint;
use crate::envelope::{emit, ResourceStream};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::model::Ack;
use crate::session::SessionStore;
use crate::transport::Transport;
use crate::validate::{Validate, ValidationError};

pub use auth::AuthRepository;
pub use contacts::ContactRepository;
pub use content::{ArtworkRepository, WritingRepository};
pub use images::ImageRepository;
pub use site::{
    DashboardRepository, NavigationItemRepository, SectionRepository, SiteRepository,
    SocialLinkRepository,
};

/// Everything a repository call needs, shared by all repositories of one
/// `FolioApi`.
pub(crate) struct Context {
    pub(crate) client: FolioClient,
    transport: Arc<dyn Transport>,
    pub(crate) session: Arc<SessionStore>,
}

impl Context {
    pub(crate) fn new(
        client: FolioClient,
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            client,
            transport,
            session,
        }
    }

    /// Execute with the stored bearer token, when there is one.
    pub(crate) async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let request = match self.session.access_token() {
            Some(token) => request.with_bearer(&token),
            None => request,
        };
        self.dispatch(request).await
    }

    /// Execute without credentials (login, refresh).
    pub(crate) async fn send_anonymous(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, ApiError> {
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "dispatching request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "response received");
        Ok(response)
    }
}

/// Generic networked-resource repository for one REST collection.
///
/// `D` is the wire DTO, `M` the domain entity it maps to, `R` the request
/// DTO accepted by create/update.
pub struct CrudRepository<D, M, R> {
    ctx: Arc<Context>,
    endpoint: CrudEndpoint<D, R>,
    _model: PhantomData<fn() -> M>,
}

impl<D, M, R> Clone for CrudRepository<D, M, R> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            endpoint: self.endpoint,
            _model: PhantomData,
        }
    }
}

impl<D, M, R> CrudRepository<D, M, R>
where
    D: DeserializeOwned + Send + 'static,
    M: From<D> + Send + 'static,
    R: Serialize + Send + 'static,
{
    pub(crate) fn new(ctx: Arc<Context>, endpoint: CrudEndpoint<D, R>) -> Self {
        Self {
            ctx,
            endpoint,
            _model: PhantomData,
        }
    }

    pub fn list(&self) -> ResourceStream<Vec<M>> {
        self.list_with(|items| items)
    }

    /// Fetch the full collection, then apply `narrow` before emitting.
    pub(crate) fn list_with<F>(&self, narrow: F) -> ResourceStream<Vec<M>>
    where
        F: FnOnce(Vec<M>) -> Vec<M> + Send + 'static,
    {
        let ctx = self.ctx.clone();
        let ep = self.endpoint;
        emit("list", async move {
            let response = ctx.send(ctx.client.build_list(ep)).await?;
            let items = ctx.client.parse_list::<D, M>(response)?;
            Ok(narrow(items))
        })
    }

    pub fn get(&self, id: i64) -> ResourceStream<M> {
        let ctx = self.ctx.clone();
        let ep = self.endpoint;
        emit("get", async move {
            let response = ctx.send(ctx.client.build_get(ep, id)).await?;
            ctx.client.parse_item::<D, M>(response)
        })
    }

    pub fn delete(&self, id: i64) -> ResourceStream<Ack> {
        let ctx = self.ctx.clone();
        let ep = self.endpoint;
        emit("delete", async move {
            let response = ctx.send(ctx.client.build_delete(ep, id)).await?;
            ctx.client.parse_ack(response)
        })
    }
}

impl<D, M, R> CrudRepository<D, M, R>
where
    D: DeserializeOwned + Send + 'static,
    M: From<D> + Send + 'static,
    R: Serialize + Validate + Send + 'static,
{
    /// Create from a form. Invalid input comes back as `Err` and nothing is
    /// sent.
    pub fn create(&self, input: R) -> Result<ResourceStream<Ack>, ValidationError> {
        input.validate()?;
        let ctx = self.ctx.clone();
        let ep = self.endpoint;
        Ok(emit("create", async move {
            let request = ctx.client.build_create(ep, &input)?;
            let response = ctx.send(request).await?;
            ctx.client.parse_ack(response)
        }))
    }

    pub fn update(&self, id: i64, input: R) -> Result<ResourceStream<Ack>, ValidationError> {
        input.validate()?;
        let ctx = self.ctx.clone();
        let ep = self.endpoint;
        Ok(emit("update", async move {
            let request = ctx.client.build_update(ep, id, &input)?;
            let response = ctx.send(request).await?;
            ctx.client.parse_ack(response)
        }))
    }
}
