//! C-ABI wrapper around `folio-core`.
//!
//! # Overview
//! Exposes the folio admin API through `extern "C"` functions so a native
//! host can build requests and parse responses without linking to Rust's
//! async runtime. The host performs every HTTP round-trip itself.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Collection operations take the collection name (`"artworks"`,
//!   `"writings"`, `"images"`, `"contacts"`, `"navigation_items"`,
//!   `"social_links"`, `"sections"`) instead of one entry point per entity.
//! - Create and update inputs cross as JSON text in the request DTO shape.
//! - Every parse returns an `FfiFolioResult` whose message and code follow
//!   the same error mapping as the async repositories.
//! - The caller owns all returned pointers and must release them with the
//!   matching `folio_free_*` function.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::Utc;
use folio_core::dto::{
    ArtworkDto, ArtworkRequest, BatchDeleteRequest, ContactDto, DashboardStatsDto, HeroDto,
    HeroRequest, ImageDto, ImageMetaRequest, LoginRequest, LoginResponseDto, NavigationItemDto,
    NavigationItemRequest, ProfileDto, ProfileRequest, SectionDto, SectionRequest,
    SiteSettingDto, SiteSettingRequest, SocialLinkDto, SocialLinkRequest, TokenRequest, TypeDto,
    WritingDto, WritingRequest,
};
use folio_core::endpoint::{self, CrudEndpoint};
use folio_core::filter::{by_read_state, by_type_name};
use folio_core::session::session_from_login;
use folio_core::{
    ApiError, Artwork, ArtworkType, Contact, DashboardStats, FolioClient, HeroContent,
    HttpRequest, HttpResponse, ImageMeta, NavigationItem, Profile, Section, SiteSetting,
    SocialLink, UploadFile, Validate, Writing, WritingType,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use types::*;

// ---------------------------------------------------------------------------
// Dispatch helpers
// ---------------------------------------------------------------------------

/// Run `f` against the endpoint, DTO and model types of `$coll`.
macro_rules! per_collection {
    ($coll:expr, $f:ident($($arg:expr),*)) => {
        match $coll {
            Collection::Artworks => $f::<ArtworkDto, Artwork, _>(endpoint::ARTWORKS $(, $arg)*),
            Collection::Writings => $f::<WritingDto, Writing, _>(endpoint::WRITINGS $(, $arg)*),
            Collection::Images => $f::<ImageDto, ImageMeta, _>(endpoint::IMAGES $(, $arg)*),
            Collection::Contacts => $f::<ContactDto, Contact, _>(endpoint::CONTACTS $(, $arg)*),
            Collection::NavigationItems => {
                $f::<NavigationItemDto, NavigationItem, _>(endpoint::NAV_ITEMS $(, $arg)*)
            }
            Collection::SocialLinks => {
                $f::<SocialLinkDto, SocialLink, _>(endpoint::SOCIAL_LINKS $(, $arg)*)
            }
            Collection::Sections => $f::<SectionDto, Section, _>(endpoint::SECTIONS $(, $arg)*),
        }
    };
}

fn list_request<D, M, R>(ep: CrudEndpoint<D, R>, c: &FolioClient) -> HttpRequest {
    c.build_list(ep)
}

fn get_request<D, M, R>(ep: CrudEndpoint<D, R>, c: &FolioClient, id: i64) -> HttpRequest {
    c.build_get(ep, id)
}

fn delete_request<D, M, R>(ep: CrudEndpoint<D, R>, c: &FolioClient, id: i64) -> HttpRequest {
    c.build_delete(ep, id)
}

fn list_result<D, M, R>(
    _ep: CrudEndpoint<D, R>,
    c: &FolioClient,
    resp: HttpResponse,
) -> *mut FfiFolioResult
where
    D: DeserializeOwned,
    M: From<D> + Serialize,
{
    respond(c.parse_list::<D, M>(resp))
}

fn item_result<D, M, R>(
    _ep: CrudEndpoint<D, R>,
    c: &FolioClient,
    resp: HttpResponse,
) -> *mut FfiFolioResult
where
    D: DeserializeOwned,
    M: From<D> + Serialize,
{
    respond(c.parse_item::<D, M>(resp))
}

fn decode<R: DeserializeOwned>(json: &str) -> Result<R, ApiError> {
    serde_json::from_str(json).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Pass `input` through its form rules. A rejection is logged and reads as
/// a failed build.
fn validated<R: Validate>(op: &'static str, input: R) -> Option<R> {
    match input.validate() {
        Ok(()) => Some(input),
        Err(err) => {
            debug!(op, field = err.field, reason = err.message, "input rejected");
            None
        }
    }
}

fn write_request<D, R: Serialize + DeserializeOwned + Validate>(
    ep: CrudEndpoint<D, R>,
    c: &FolioClient,
    id: Option<i64>,
    json: &str,
) -> Option<HttpRequest> {
    let input = validated(ep.path(), decode::<R>(json).ok()?)?;
    match id {
        Some(id) => c.build_update(ep, id, &input).ok(),
        None => c.build_create(ep, &input).ok(),
    }
}

/// Create and update for every collection the admin can write to.
fn collection_write(
    coll: Collection,
    c: &FolioClient,
    id: Option<i64>,
    json: &str,
) -> Option<HttpRequest> {
    match coll {
        Collection::Artworks => write_request::<_, ArtworkRequest>(endpoint::ARTWORKS, c, id, json),
        Collection::Writings => write_request::<_, WritingRequest>(endpoint::WRITINGS, c, id, json),
        Collection::Images => write_request::<_, ImageMetaRequest>(endpoint::IMAGES, c, id, json),
        Collection::NavigationItems => {
            write_request::<_, NavigationItemRequest>(endpoint::NAV_ITEMS, c, id, json)
        }
        Collection::SocialLinks => {
            write_request::<_, SocialLinkRequest>(endpoint::SOCIAL_LINKS, c, id, json)
        }
        Collection::Sections => write_request::<_, SectionRequest>(endpoint::SECTIONS, c, id, json),
        Collection::Contacts => None,
    }
}

fn respond<T: Serialize>(outcome: Result<T, ApiError>) -> *mut FfiFolioResult {
    match outcome {
        Ok(value) => FfiFolioResult::ok(&value),
        Err(e) => FfiFolioResult::from_error(e),
    }
}

/// Borrow a C string argument. `None` if null or not UTF-8.
fn str_arg<'a>(p: *const c_char) -> Option<&'a str> {
    if p.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(p) }.to_str().ok()
}

fn collection_arg(p: *const c_char) -> Option<Collection> {
    str_arg(p).and_then(Collection::from_name)
}

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null or
/// non-UTF-8 body reads as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body: str_arg(resp.body).unwrap_or_default().to_string(),
    }
}

/// Shared shape of every `folio_build_*`: null client, a failed build, or a
/// panic all come back as null.
fn build_with(
    op: &'static str,
    client: *const FfiFolioClient,
    f: impl FnOnce(&FolioClient) -> Option<HttpRequest>,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match f(&client.inner) {
            Some(req) => FfiHttpRequest::from_core(client.authorize(req)),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or_else(|_| {
        error!(op, "panic caught at FFI boundary");
        std::ptr::null_mut()
    })
}

/// Shared shape of every `folio_parse_*`.
fn parse_with(
    op: &'static str,
    client: *const FfiFolioClient,
    response: *const FfiHttpResponse,
    f: impl FnOnce(&FolioClient, HttpResponse) -> *mut FfiFolioResult,
) -> *mut FfiFolioResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiFolioResult::null_arg("client");
        }
        if response.is_null() {
            return FfiFolioResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = ffi_response_to_core(unsafe { &*response });
        f(&client.inner, resp)
    }))
    .unwrap_or_else(|_| {
        error!(op, "panic caught at FFI boundary");
        FfiFolioResult::panic(&format!("panic in {op}"))
    })
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `base_url`.
///
/// Returns null if `base_url` is null or not UTF-8.
/// Free with `folio_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn folio_client_new(base_url: *const c_char) -> *mut FfiFolioClient {
    catch_unwind(|| match str_arg(base_url) {
        Some(url) => Box::into_raw(Box::new(FfiFolioClient {
            inner: FolioClient::new(url),
            token: None,
        })),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `folio_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn folio_client_free(client: *mut FfiFolioClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Set the bearer token attached to every request built afterwards.
/// Pass null to clear it (after logout).
#[unsafe(no_mangle)]
pub extern "C" fn folio_client_set_token(client: *mut FfiFolioClient, token: *const c_char) {
    if client.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let client = unsafe { &mut *client };
        client.token = str_arg(token)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }));
}

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Returns false if a subscriber was already installed.
#[unsafe(no_mangle)]
pub extern "C" fn folio_init_logging() -> bool {
    catch_unwind(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init()
            .is_ok()
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build the login request. Never carries a bearer token. Blank credentials
/// return null.
#[unsafe(no_mangle)]
pub extern "C" fn folio_build_login(
    client: *const FfiFolioClient,
    username: *const c_char,
    password: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let (Some(username), Some(password)) = (str_arg(username), str_arg(password)) else {
            return std::ptr::null_mut();
        };
        let input = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let Some(input) = validated("folio_build_login", input) else {
            return std::ptr::null_mut();
        };
        match client.inner.build_login(&input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the token refresh request. Never carries a bearer token.
#[unsafe(no_mangle)]
pub extern "C" fn folio_build_refresh(
    client: *const FfiFolioClient,
    refresh_token: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(token) = str_arg(refresh_token) else {
            return std::ptr::null_mut();
        };
        let input = TokenRequest {
            refresh_token: token.to_string(),
        };
        match client.inner.build_refresh(&input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the logout request for `refresh_token`.
#[unsafe(no_mangle)]
pub extern "C" fn folio_build_logout(
    client: *const FfiFolioClient,
    refresh_token: *const c_char,
) -> *mut FfiHttpRequest {
    build_with("folio_build_logout", client, |c| {
        let input = TokenRequest {
            refresh_token: str_arg(refresh_token)?.to_string(),
        };
        c.build_logout(&input).ok()
    })
}

/// Build a request listing every item of `collection`.
///
/// Returns null if `client` is null or `collection` is unknown.
#[unsafe(no_mangle)]
pub extern "C" fn folio_build_list(
    client: *const FfiFolioClient,
    collection: *const c_char,
) -> *mut FfiHttpRequest {
    build_with("folio_build_list", client, |c| {
        let coll = collection_arg(collection)?;
        Some(per_collection!(coll, list_request(c)))
    })
}

/// Build a request fetching one item of `collection`.
#[unsafe(no_mangle)]
pub extern "C" fn folio_build_get(
    client: *const FfiFolioClient,
    collection: *const c_char,
    id: i64,
) -> *mut FfiHttpRequest {
    build_with("folio_build_get", client, |c| {
        let coll = collection_arg(collection)?;
        Some(per_collection!(coll, get_request(c, id)))
    })
}

/// Build a create request. `json` is the request body in the collection's
/// input shape (camelCase keys).
///
/// Returns null if `json` does not decode into that shape or fails the
/// form rules, and for `"contacts"`, which cannot be created.
#[unsafe(no_mangle)]
pub extern "C" fn folio_build_create(
    client: *const FfiFolioClient,
    collection: *const c_char,
    json: *const c_char,
) -> *mut FfiHttpRequest {
    build_with("folio_build_create", client, |c| {
        collection_write(collection_arg(collection)?, c, None, str_arg(json)?)
    })
}

/// Build an update request. Same input rules as `folio_build_create`.
#[unsafe(no_mangle)]
pub extern "C" fn folio_build_update(
    client: *const FfiFolioClient,
    collection: *const c_char,
    id: i64,
    json: *const c_char,
) -> *mut FfiHttpRequest {
    build_with("folio_build_update", client, |c| {
        collection_write(collection_arg(collection)?, c, Some(id), str_arg(json)?)
    })
}

/// Build a request deleting one item of `collection`.
#[unsafe(no_mangle)]
pub extern "C" fn folio_build_delete(
    client: *const FfiFolioClient,
    collection: *const c_char,
    id: i64,
) -> *mut FfiHttpRequest {
    build_with("folio_build_delete", client, |c| {
        let coll = collection_arg(collection)?;
        Some(per_collection!(coll, delete_request(c, id)))
    })
}

/// Build the type-list request for `"artworks"` or `"writings"`.
#[unsafe(no_mangle)]
pub extern "C" fn folio_build_types(
    client: *const FfiFolioClient,
    collection: *const c_char,
) -> *mut FfiHttpRequest {
    build_with("folio_build_types", client, |c| {
        match collection_arg(collection)? {
            Collection::Artworks => Some(c.build_artwork_types()),
            Collection::Writings => Some(c.build_writing_types()),
            _ => None,
        }
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn folio_build_mark_contact_read(
    client: *const FfiFolioClient,
    id: i64,
) -> *mut FfiHttpRequest {
    build_with("folio_build_mark_contact_read", client, |c| {
        Some(c.build_mark_contact_read(id))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn folio_build_dashboard_stats(
    client: *const FfiFolioClient,
) -> *mut FfiHttpRequest {
    build_with("folio_build_dashboard_stats", client, |c| {
        Some(c.build_dashboard_stats())
    })
}

/// Build a multipart image upload. `bytes` may be null only when `len` is 0.
/// `alt_text` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn folio_build_upload_image(
    client: *const FfiFolioClient,
    filename: *const c_char,
    mime_type: *const c_char,
    bytes: *const u8,
    len: usize,
    alt_text: *const c_char,
) -> *mut FfiHttpRequest {
    build_with("folio_build_upload_image", client, |c| {
        if bytes.is_null() && len > 0 {
            return None;
        }
        let content = if len == 0 {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(bytes, len) }.to_vec()
        };
        let file = UploadFile {
            filename: str_arg(filename)?.to_string(),
            mime_type: str_arg(mime_type)?.to_string(),
            bytes: content,
        };
        Some(c.build_upload_image(&file, str_arg(alt_text)))
    })
}

/// Build a batch image delete for `len` ids starting at `ids`. An empty
/// selection returns null.
#[unsafe(no_mangle)]
pub extern "C" fn folio_build_batch_delete_images(
    client: *const FfiFolioClient,
    ids: *const i64,
    len: usize,
) -> *mut FfiHttpRequest {
    build_with("folio_build_batch_delete_images", client, |c| {
        if ids.is_null() {
            return None;
        }
        let input = BatchDeleteRequest {
            ids: unsafe { std::slice::from_raw_parts(ids, len) }.to_vec(),
        };
        let input = validated("folio_build_batch_delete_images", input)?;
        c.build_batch_delete_images(&input).ok()
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn folio_build_get_profile(client: *const FfiFolioClient) -> *mut FfiHttpRequest {
    build_with("folio_build_get_profile", client, |c| {
        Some(c.build_get_profile())
    })
}

/// `json` is a profile body with camelCase keys.
#[unsafe(no_mangle)]
pub extern "C" fn folio_build_update_profile(
    client: *const FfiFolioClient,
    json: *const c_char,
) -> *mut FfiHttpRequest {
    build_with("folio_build_update_profile", client, |c| {
        let input: ProfileRequest = decode(str_arg(json)?).ok()?;
        let input = validated("folio_build_update_profile", input)?;
        c.build_update_profile(&input).ok()
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn folio_build_get_hero(client: *const FfiFolioClient) -> *mut FfiHttpRequest {
    build_with("folio_build_get_hero", client, |c| Some(c.build_get_hero()))
}

/// `json` is a hero body with camelCase keys.
#[unsafe(no_mangle)]
pub extern "C" fn folio_build_update_hero(
    client: *const FfiFolioClient,
    json: *const c_char,
) -> *mut FfiHttpRequest {
    build_with("folio_build_update_hero", client, |c| {
        let input: HeroRequest = decode(str_arg(json)?).ok()?;
        let input = validated("folio_build_update_hero", input)?;
        c.build_update_hero(&input).ok()
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn folio_build_list_settings(
    client: *const FfiFolioClient,
) -> *mut FfiHttpRequest {
    build_with("folio_build_list_settings", client, |c| {
        Some(c.build_list_settings())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn folio_build_update_setting(
    client: *const FfiFolioClient,
    id: i64,
    value: *const c_char,
) -> *mut FfiHttpRequest {
    build_with("folio_build_update_setting", client, |c| {
        let input = SiteSettingRequest {
            value: str_arg(value)?.to_string(),
        };
        let input = validated("folio_build_update_setting", input)?;
        c.build_update_setting(id, &input).ok()
    })
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Parse a login or refresh response into the session JSON
/// (`accessToken`, `refreshToken`, `username`, `displayName`, `expiresAt`).
///
/// The host stores the session and hands `accessToken` to
/// `folio_client_set_token`.
#[unsafe(no_mangle)]
pub extern "C" fn folio_parse_login(
    client: *const FfiFolioClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFolioResult {
    parse_with("folio_parse_login", client, response, |c, resp| {
        respond(
            c.parse_json::<LoginResponseDto>(resp)
                .map(|dto| session_from_login(dto, Utc::now())),
        )
    })
}

/// Parse a list response for `collection` into a JSON array.
#[unsafe(no_mangle)]
pub extern "C" fn folio_parse_list(
    client: *const FfiFolioClient,
    collection: *const c_char,
    response: *const FfiHttpResponse,
) -> *mut FfiFolioResult {
    parse_with("folio_parse_list", client, response, |c, resp| {
        match collection_arg(collection) {
            Some(coll) => per_collection!(coll, list_result(c, resp)),
            None => FfiFolioResult::invalid_arg("unknown collection"),
        }
    })
}

/// Parse an artwork or writing list, keeping only items whose type name
/// equals `type_name`. A null `type_name` keeps everything.
#[unsafe(no_mangle)]
pub extern "C" fn folio_parse_list_by_type(
    client: *const FfiFolioClient,
    collection: *const c_char,
    type_name: *const c_char,
    response: *const FfiHttpResponse,
) -> *mut FfiFolioResult {
    parse_with("folio_parse_list_by_type", client, response, |c, resp| {
        let wanted = str_arg(type_name);
        match collection_arg(collection) {
            Some(Collection::Artworks) => respond(
                c.parse_list::<ArtworkDto, Artwork>(resp)
                    .map(|items| by_type_name(items, wanted)),
            ),
            Some(Collection::Writings) => respond(
                c.parse_list::<WritingDto, Writing>(resp)
                    .map(|items| by_type_name(items, wanted)),
            ),
            _ => FfiFolioResult::invalid_arg("type filter applies to artworks and writings"),
        }
    })
}

/// Parse the contact list, filtered by read state.
///
/// `is_read` is tri-state: -1 = all, 0 = unread only, 1 = read only.
#[unsafe(no_mangle)]
pub extern "C" fn folio_parse_contacts(
    client: *const FfiFolioClient,
    is_read: i32,
    response: *const FfiHttpResponse,
) -> *mut FfiFolioResult {
    parse_with("folio_parse_contacts", client, response, |c, resp| {
        let wanted = match is_read {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        };
        respond(
            c.parse_list::<ContactDto, Contact>(resp)
                .map(|items| by_read_state(items, wanted)),
        )
    })
}

/// Parse a single-item response for `collection` into a JSON object.
#[unsafe(no_mangle)]
pub extern "C" fn folio_parse_item(
    client: *const FfiFolioClient,
    collection: *const c_char,
    response: *const FfiHttpResponse,
) -> *mut FfiFolioResult {
    parse_with("folio_parse_item", client, response, |c, resp| {
        match collection_arg(collection) {
            Some(coll) => per_collection!(coll, item_result(c, resp)),
            None => FfiFolioResult::invalid_arg("unknown collection"),
        }
    })
}

/// Parse the acknowledgement of any mutation: `{"kind":"created","id":..}`
/// or `{"kind":"message","message":..}`. An empty 2xx body is `"OK"`.
#[unsafe(no_mangle)]
pub extern "C" fn folio_parse_ack(
    client: *const FfiFolioClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFolioResult {
    parse_with("folio_parse_ack", client, response, |c, resp| {
        respond(c.parse_ack(resp))
    })
}

/// Parse the type list of `"artworks"` or `"writings"`.
#[unsafe(no_mangle)]
pub extern "C" fn folio_parse_types(
    client: *const FfiFolioClient,
    collection: *const c_char,
    response: *const FfiHttpResponse,
) -> *mut FfiFolioResult {
    parse_with("folio_parse_types", client, response, |c, resp| {
        match collection_arg(collection) {
            Some(Collection::Artworks) => {
                respond(c.parse_list::<TypeDto, ArtworkType>(resp))
            }
            Some(Collection::Writings) => {
                respond(c.parse_list::<TypeDto, WritingType>(resp))
            }
            _ => FfiFolioResult::invalid_arg("types exist for artworks and writings"),
        }
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn folio_parse_dashboard_stats(
    client: *const FfiFolioClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFolioResult {
    parse_with("folio_parse_dashboard_stats", client, response, |c, resp| {
        respond(c.parse_item::<DashboardStatsDto, DashboardStats>(resp))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn folio_parse_profile(
    client: *const FfiFolioClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFolioResult {
    parse_with("folio_parse_profile", client, response, |c, resp| {
        respond(c.parse_item::<ProfileDto, Profile>(resp))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn folio_parse_hero(
    client: *const FfiFolioClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFolioResult {
    parse_with("folio_parse_hero", client, response, |c, resp| {
        respond(c.parse_item::<HeroDto, HeroContent>(resp))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn folio_parse_settings(
    client: *const FfiFolioClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFolioResult {
    parse_with("folio_parse_settings", client, response, |c, resp| {
        respond(c.parse_list::<SiteSettingDto, SiteSetting>(resp))
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by any `folio_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn folio_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { free_request(Box::from_raw(req)) });
}

/// Free a result returned by any `folio_parse_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn folio_free_result(result: *mut FfiFolioResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.message);
        free_c_string(result.data);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn folio_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    use serde_json::Value;

    const BASE: &str = "http://localhost:3000";

    fn client() -> *mut FfiFolioClient {
        let url = CString::new(BASE).unwrap();
        folio_client_new(url.as_ptr())
    }

    fn path(req: &FfiHttpRequest) -> &str {
        unsafe { CStr::from_ptr(req.path) }.to_str().unwrap()
    }

    fn body_json(req: &FfiHttpRequest) -> Value {
        let bytes = unsafe { std::slice::from_raw_parts(req.body, req.body_len) };
        serde_json::from_slice(bytes).unwrap()
    }

    fn header<'a>(req: &'a FfiHttpRequest, name: &str) -> Option<&'a str> {
        if req.headers.is_null() {
            return None;
        }
        let headers = unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) };
        headers.iter().find_map(|h| {
            let key = unsafe { CStr::from_ptr(h.key) }.to_str().unwrap();
            key.eq_ignore_ascii_case(name)
                .then(|| unsafe { CStr::from_ptr(h.value) }.to_str().unwrap())
        })
    }

    fn parse(
        f: impl FnOnce(*const FfiFolioClient, *const FfiHttpResponse) -> *mut FfiFolioResult,
        status: u16,
        body: &str,
    ) -> (FfiResultState, FfiErrorKind, Option<u16>, Option<String>, Option<Value>) {
        let c = client();
        let body = CString::new(body).unwrap();
        let resp = FfiHttpResponse {
            status,
            body: body.as_ptr(),
        };
        let result = f(c as *const FfiFolioClient, &resp as *const FfiHttpResponse);
        let r = unsafe { &*result };
        let text = |p: *mut c_char| {
            (!p.is_null()).then(|| unsafe { CStr::from_ptr(p) }.to_str().unwrap().to_string())
        };
        let out = (
            r.state,
            r.error_kind,
            r.has_code.then_some(r.code),
            text(r.message),
            text(r.data).map(|d| serde_json::from_str(&d).unwrap()),
        );
        folio_free_result(result);
        folio_client_free(c);
        out
    }

    #[test]
    fn client_new_null_returns_null() {
        assert!(folio_client_new(std::ptr::null()).is_null());
        folio_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_list_without_token_has_no_auth_header() {
        let c = client();
        let coll = CString::new("artworks").unwrap();
        let req = folio_build_list(c, coll.as_ptr());
        assert!(!req.is_null());

        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Get);
        assert_eq!(path(r), "http://localhost:3000/api/artworks");
        assert!(header(r, "authorization").is_none());
        assert!(r.body.is_null());

        folio_free_request(req);
        folio_client_free(c);
    }

    #[test]
    fn token_is_attached_then_cleared() {
        let c = client();
        let token = CString::new("abc").unwrap();
        folio_client_set_token(c, token.as_ptr());

        let req = folio_build_dashboard_stats(c);
        assert_eq!(header(unsafe { &*req }, "authorization"), Some("Bearer abc"));
        folio_free_request(req);

        folio_client_set_token(c, std::ptr::null());
        let req = folio_build_dashboard_stats(c);
        assert!(header(unsafe { &*req }, "authorization").is_none());
        folio_free_request(req);
        folio_client_free(c);
    }

    #[test]
    fn login_never_carries_bearer() {
        let c = client();
        let token = CString::new("stale").unwrap();
        folio_client_set_token(c, token.as_ptr());
        let user = CString::new("admin").unwrap();
        let pass = CString::new("admin123").unwrap();

        let req = folio_build_login(c, user.as_ptr(), pass.as_ptr());
        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Post);
        assert_eq!(path(r), "http://localhost:3000/api/auth/login");
        assert!(header(r, "authorization").is_none());
        assert_eq!(body_json(r)["username"], "admin");

        folio_free_request(req);
        folio_client_free(c);
    }

    #[test]
    fn unknown_collection_returns_null() {
        let c = client();
        let coll = CString::new("paintings").unwrap();
        assert!(folio_build_list(c, coll.as_ptr()).is_null());
        assert!(folio_build_get(c, std::ptr::null(), 1).is_null());
        folio_client_free(c);
    }

    #[test]
    fn build_create_decodes_json_input() {
        let c = client();
        let coll = CString::new("navigation_items").unwrap();
        let json = CString::new(r#"{"label":"Home","url":"/","sortOrder":1,"visible":true}"#)
            .unwrap();
        let req = folio_build_create(c, coll.as_ptr(), json.as_ptr());
        assert!(!req.is_null());

        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Post);
        assert_eq!(path(r), "http://localhost:3000/api/navigation/items");
        assert_eq!(header(r, "content-type"), Some("application/json"));
        assert_eq!(body_json(r)["sortOrder"], 1);

        folio_free_request(req);
        folio_client_free(c);
    }

    #[test]
    fn build_create_rejects_bad_json_and_contacts() {
        let c = client();
        let artworks = CString::new("artworks").unwrap();
        let bad = CString::new(r#"{"title": 5}"#).unwrap();
        assert!(folio_build_create(c, artworks.as_ptr(), bad.as_ptr()).is_null());

        let contacts = CString::new("contacts").unwrap();
        let empty = CString::new("{}").unwrap();
        assert!(folio_build_create(c, contacts.as_ptr(), empty.as_ptr()).is_null());
        folio_client_free(c);
    }

    #[test]
    fn builders_reject_invalid_forms() {
        let c = client();
        let artworks = CString::new("artworks").unwrap();
        let untitled = CString::new(
            r#"{"title":" ","typeName":"painting","sortOrder":0,"published":false}"#,
        )
        .unwrap();
        assert!(folio_build_create(c, artworks.as_ptr(), untitled.as_ptr()).is_null());
        assert!(folio_build_update(c, artworks.as_ptr(), 2, untitled.as_ptr()).is_null());

        let nav = CString::new("navigation_items").unwrap();
        let relative =
            CString::new(r#"{"label":"Blog","url":"blog","sortOrder":0,"visible":true}"#).unwrap();
        assert!(folio_build_create(c, nav.as_ptr(), relative.as_ptr()).is_null());

        let (blank, pass) = (CString::new("").unwrap(), CString::new("admin123").unwrap());
        assert!(folio_build_login(c, blank.as_ptr(), pass.as_ptr()).is_null());

        let no_headline = CString::new(r#"{"headline":""}"#).unwrap();
        assert!(folio_build_update_hero(c, no_headline.as_ptr()).is_null());

        let ids: [i64; 0] = [];
        assert!(folio_build_batch_delete_images(c, ids.as_ptr(), 0).is_null());
        folio_client_free(c);
    }

    #[test]
    fn build_update_uses_put_with_id() {
        let c = client();
        let coll = CString::new("writings").unwrap();
        let json = CString::new(
            r#"{"title":"On Light","content":"...","typeName":"essay","published":false}"#,
        )
        .unwrap();
        let req = folio_build_update(c, coll.as_ptr(), 7, json.as_ptr());
        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Put);
        assert_eq!(path(r), "http://localhost:3000/api/writings/7");
        assert!(body_json(r).get("summary").is_none());

        folio_free_request(req);
        folio_client_free(c);
    }

    #[test]
    fn build_delete_and_mark_read() {
        let c = client();
        let coll = CString::new("social_links").unwrap();
        let req = folio_build_delete(c, coll.as_ptr(), 3);
        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Delete);
        assert_eq!(path(r), "http://localhost:3000/api/navigation/social-links/3");
        folio_free_request(req);

        let req = folio_build_mark_contact_read(c, 2);
        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Put);
        assert_eq!(path(r), "http://localhost:3000/api/contacts/2/read");
        folio_free_request(req);
        folio_client_free(c);
    }

    #[test]
    fn build_upload_carries_binary_multipart() {
        let c = client();
        let name = CString::new("a.png").unwrap();
        let mime = CString::new("image/png").unwrap();
        let bytes = [0x89u8, 0x00, 0xFF];
        let req = folio_build_upload_image(
            c,
            name.as_ptr(),
            mime.as_ptr(),
            bytes.as_ptr(),
            bytes.len(),
            std::ptr::null(),
        );
        let r = unsafe { &*req };
        assert_eq!(path(r), "http://localhost:3000/api/images/upload");
        assert!(header(r, "content-type")
            .unwrap()
            .starts_with("multipart/form-data; boundary="));
        let body = unsafe { std::slice::from_raw_parts(r.body, r.body_len) };
        assert!(body.windows(3).any(|w| w == bytes));

        folio_free_request(req);
        folio_client_free(c);
    }

    #[test]
    fn build_batch_delete_needs_ids() {
        let c = client();
        assert!(folio_build_batch_delete_images(c, std::ptr::null(), 0).is_null());

        let ids = [4i64, 9];
        let req = folio_build_batch_delete_images(c, ids.as_ptr(), ids.len());
        let r = unsafe { &*req };
        assert_eq!(path(r), "http://localhost:3000/api/images/batch-delete");
        assert_eq!(body_json(r), serde_json::json!({"ids": [4, 9]}));
        folio_free_request(req);
        folio_client_free(c);
    }

    #[test]
    fn build_types_only_for_typed_collections() {
        let c = client();
        let writings = CString::new("writings").unwrap();
        let req = folio_build_types(c, writings.as_ptr());
        assert_eq!(
            path(unsafe { &*req }),
            "http://localhost:3000/api/writings/types"
        );
        folio_free_request(req);

        let images = CString::new("images").unwrap();
        assert!(folio_build_types(c, images.as_ptr()).is_null());
        folio_client_free(c);
    }

    #[test]
    fn parse_list_maps_to_models() {
        let coll = CString::new("artworks").unwrap();
        let (state, kind, code, message, data) = parse(
            |c, r| folio_parse_list(c, coll.as_ptr(), r),
            200,
            r#"[{"id":1,"title":"Dawn","typeName":"painting","sortOrder":0,"published":true}]"#,
        );
        assert_eq!(state, FfiResultState::Success);
        assert_eq!(kind, FfiErrorKind::None);
        assert_eq!(code, None);
        assert!(message.is_none());
        let data = data.unwrap();
        assert_eq!(data[0]["title"], "Dawn");
        assert_eq!(data[0]["typeName"], "painting");
    }

    #[test]
    fn parse_list_by_type_filters() {
        let coll = CString::new("artworks").unwrap();
        let wanted = CString::new("drawing").unwrap();
        let (_, _, _, _, data) = parse(
            |c, r| folio_parse_list_by_type(c, coll.as_ptr(), wanted.as_ptr(), r),
            200,
            r#"[{"id":1,"title":"A","typeName":"painting"},{"id":2,"title":"B","typeName":"drawing"}]"#,
        );
        let data = data.unwrap();
        assert_eq!(data.as_array().unwrap().len(), 1);
        assert_eq!(data[0]["id"], 2);
    }

    #[test]
    fn parse_contacts_unread_only() {
        let (_, _, _, _, data) = parse(
            |c, r| folio_parse_contacts(c, 0, r),
            200,
            r#"[{"id":1,"name":"A","email":"a@x","message":"hi","isRead":true},
                {"id":2,"name":"B","email":"b@x","message":"yo","isRead":false}]"#,
        );
        let data = data.unwrap();
        assert_eq!(data.as_array().unwrap().len(), 1);
        assert_eq!(data[0]["id"], 2);
    }

    #[test]
    fn parse_error_uses_server_message_and_code() {
        let coll = CString::new("sections").unwrap();
        let (state, kind, code, message, data) = parse(
            |c, r| folio_parse_item(c, coll.as_ptr(), r),
            404,
            r#"{"message":"section not found"}"#,
        );
        assert_eq!(state, FfiResultState::Error);
        assert_eq!(kind, FfiErrorKind::Http);
        assert_eq!(code, Some(404));
        assert_eq!(message.as_deref(), Some("section not found"));
        assert!(data.is_none());
    }

    #[test]
    fn parse_error_without_body_falls_back_to_status() {
        let (_, _, code, message, _) = parse(|c, r| folio_parse_ack(c, r), 500, "");
        assert_eq!(code, Some(500));
        assert_eq!(message.as_deref(), Some("HTTP 500"));
    }

    #[test]
    fn parse_ack_created_and_empty() {
        let (_, _, _, _, data) = parse(
            |c, r| folio_parse_ack(c, r),
            201,
            r#"{"id":12,"message":"created"}"#,
        );
        assert_eq!(data.unwrap(), serde_json::json!({"kind": "created", "id": 12}));

        let (state, _, _, _, data) = parse(|c, r| folio_parse_ack(c, r), 204, "");
        assert_eq!(state, FfiResultState::Success);
        assert_eq!(data.unwrap()["kind"], "message");
    }

    #[test]
    fn parse_login_builds_session() {
        let (state, _, _, _, data) = parse(
            |c, r| folio_parse_login(c, r),
            200,
            r#"{"accessToken":"a1","refreshToken":"r1","username":"admin"}"#,
        );
        assert_eq!(state, FfiResultState::Success);
        let data = data.unwrap();
        assert_eq!(data["accessToken"], "a1");
        assert_eq!(data["displayName"], "admin");
        assert!(data["expiresAt"].is_string());
    }

    #[test]
    fn parse_garbage_is_deserialization_without_code() {
        let (state, kind, code, message, _) =
            parse(|c, r| folio_parse_dashboard_stats(c, r), 200, "not json");
        assert_eq!(state, FfiResultState::Error);
        assert_eq!(kind, FfiErrorKind::Deserialization);
        assert_eq!(code, None);
        assert!(message.unwrap().starts_with("deserialization failed"));
    }

    #[test]
    fn parse_unknown_collection_is_invalid_arg() {
        let coll = CString::new("nope").unwrap();
        let (_, kind, _, _, _) = parse(|c, r| folio_parse_list(c, coll.as_ptr(), r), 200, "[]");
        assert_eq!(kind, FfiErrorKind::InvalidArg);
    }

    #[test]
    fn parse_null_args() {
        let body = CString::new("[]").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = folio_parse_settings(std::ptr::null(), &resp);
        assert_eq!(unsafe { &*result }.error_kind, FfiErrorKind::NullArg);
        folio_free_result(result);

        let c = client();
        let result = folio_parse_settings(c, std::ptr::null());
        assert_eq!(unsafe { &*result }.error_kind, FfiErrorKind::NullArg);
        folio_free_result(result);
        folio_client_free(c);
    }

    #[test]
    fn free_functions_accept_null() {
        folio_free_request(std::ptr::null_mut());
        folio_free_result(std::ptr::null_mut());
        folio_free_string(std::ptr::null_mut());
    }
}
