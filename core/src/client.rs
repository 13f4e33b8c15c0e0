//! Stateless HTTP request builder and response parser for the folio API.
//!
//! # Design
//! `FolioClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. The
//! caller executes the HTTP round-trip in between, which keeps this half of
//! the core deterministic and lets the FFI expose it to a native host.
//!
//! Collection operations are generic over `CrudEndpoint`; the handful of
//! endpoints that do not fit the collection shape get dedicated builders.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::dto::{
    AckDto, BatchDeleteRequest, ErrorBodyDto, HeroRequest, LoginRequest, ProfileRequest,
    SiteSettingRequest, TokenRequest,
};
use crate::endpoint::{self, CrudEndpoint};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Multipart, UploadFile};
use crate::model::Ack;

/// Synchronous, stateless client for the folio API.
#[derive(Debug, Clone)]
pub struct FolioClient {
    base_url: String,
}

impl FolioClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get(&self, path: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.url(path))
    }

    fn json<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_vec(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut req = HttpRequest::new(method, self.url(path));
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }

    // -----------------------------------------------------------------------
    // Collections
    // -----------------------------------------------------------------------

    pub fn build_list<D, R>(&self, ep: CrudEndpoint<D, R>) -> HttpRequest {
        self.get(ep.path())
    }

    pub fn build_get<D, R>(&self, ep: CrudEndpoint<D, R>, id: i64) -> HttpRequest {
        self.get(&format!("{}/{id}", ep.path()))
    }

    pub fn build_create<D, R: Serialize>(
        &self,
        ep: CrudEndpoint<D, R>,
        input: &R,
    ) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Post, ep.path(), input)
    }

    pub fn build_update<D, R: Serialize>(
        &self,
        ep: CrudEndpoint<D, R>,
        id: i64,
        input: &R,
    ) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Put, &format!("{}/{id}", ep.path()), input)
    }

    pub fn build_delete<D, R>(&self, ep: CrudEndpoint<D, R>, id: i64) -> HttpRequest {
        HttpRequest::new(
            HttpMethod::Delete,
            self.url(&format!("{}/{id}", ep.path())),
        )
    }

    // -----------------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------------

    pub fn build_login(&self, input: &LoginRequest) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Post, endpoint::LOGIN, input)
    }

    pub fn build_logout(&self, input: &TokenRequest) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Post, endpoint::LOGOUT, input)
    }

    pub fn build_refresh(&self, input: &TokenRequest) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Post, endpoint::REFRESH, input)
    }

    // -----------------------------------------------------------------------
    // Everything that is not a plain collection
    // -----------------------------------------------------------------------

    pub fn build_dashboard_stats(&self) -> HttpRequest {
        self.get(endpoint::DASHBOARD_STATS)
    }

    pub fn build_artwork_types(&self) -> HttpRequest {
        self.get(endpoint::ARTWORK_TYPES)
    }

    pub fn build_writing_types(&self) -> HttpRequest {
        self.get(endpoint::WRITING_TYPES)
    }

    pub fn build_upload_image(&self, file: &UploadFile, alt_text: Option<&str>) -> HttpRequest {
        let mut form = Multipart::new().file("file", file);
        if let Some(alt) = alt_text {
            form = form.text("altText", alt);
        }
        let (content_type, body) = form.finish();
        let mut req = HttpRequest::new(HttpMethod::Post, self.url(endpoint::IMAGE_UPLOAD));
        req.headers.push(("content-type".to_string(), content_type));
        req.body = Some(body);
        req
    }

    pub fn build_batch_delete_images(
        &self,
        input: &BatchDeleteRequest,
    ) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Post, endpoint::IMAGE_BATCH_DELETE, input)
    }

    pub fn build_mark_contact_read(&self, id: i64) -> HttpRequest {
        HttpRequest::new(
            HttpMethod::Put,
            self.url(&format!("{}/{id}/read", endpoint::CONTACTS.path())),
        )
    }

    pub fn build_get_profile(&self) -> HttpRequest {
        self.get(endpoint::PROFILE)
    }

    pub fn build_update_profile(&self, input: &ProfileRequest) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Put, endpoint::PROFILE, input)
    }

    pub fn build_get_hero(&self) -> HttpRequest {
        self.get(endpoint::HERO)
    }

    pub fn build_update_hero(&self, input: &HeroRequest) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Put, endpoint::HERO, input)
    }

    pub fn build_list_settings(&self) -> HttpRequest {
        self.get(endpoint::SETTINGS)
    }

    pub fn build_update_setting(
        &self,
        id: i64,
        input: &SiteSettingRequest,
    ) -> Result<HttpRequest, ApiError> {
        self.json(
            HttpMethod::Put,
            &format!("{}/{id}", endpoint::SETTINGS),
            input,
        )
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    /// Parse a 2xx JSON body into `T`.
    pub fn parse_json<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Parse a 2xx JSON body into `D` and map it to the domain type `M`.
    pub fn parse_item<D, M>(&self, response: HttpResponse) -> Result<M, ApiError>
    where
        D: DeserializeOwned,
        M: From<D>,
    {
        self.parse_json::<D>(response).map(M::from)
    }

    /// Parse a 2xx JSON array of `D` and map every element to `M`.
    pub fn parse_list<D, M>(&self, response: HttpResponse) -> Result<Vec<M>, ApiError>
    where
        D: DeserializeOwned,
        M: From<D>,
    {
        let items: Vec<D> = self.parse_json(response)?;
        Ok(items.into_iter().map(M::from).collect())
    }

    /// Parse a mutation acknowledgement. An empty 2xx body (e.g. 204) is a
    /// plain "OK".
    pub fn parse_ack(&self, response: HttpResponse) -> Result<Ack, ApiError> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(Ack::from(AckDto::default()));
        }
        serde_json::from_str::<AckDto>(&response.body)
            .map(Ack::from)
            .map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

/// Map non-2xx responses to `ApiError::Http`, pulling the server's message
/// out of the body when there is one.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        message: server_message(&response.body),
    })
}

fn server_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<ErrorBodyDto>(body) {
        Ok(dto) => [dto.message, dto.error]
            .into_iter()
            .flatten()
            .map(|m| m.trim().to_string())
            .find(|m| !m.is_empty()),
        // A bare-text body is the message; an HTML error page is not.
        Err(_) if !body.starts_with('<') && !body.starts_with('{') => Some(body.to_string()),
        Err(_) => None,
    }
}
