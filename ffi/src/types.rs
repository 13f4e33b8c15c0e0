//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Requests cross as plain data with C strings for text and a pointer plus
//! length for the body, since an image upload body is binary. Parse results
//! cross as one `FfiFolioResult` envelope: the terminal half of a `Resource`
//! with the payload serialized to a JSON C string, so the host needs one
//! free function regardless of which entity came back.

use std::ffi::CString;
use std::os::raw::c_char;

use folio_core::error::ApiError;
use folio_core::http::HttpMethod;
use folio_core::Resource;
use serde::Serialize;

/// Opaque handle to a `FolioClient` plus the bearer token the host wants
/// attached to protected requests.
pub struct FfiFolioClient {
    pub(crate) inner: folio_core::FolioClient,
    pub(crate) token: Option<String>,
}

impl FfiFolioClient {
    /// Attach the stored bearer token, if any.
    pub(crate) fn authorize(&self, req: folio_core::HttpRequest) -> folio_core::HttpRequest {
        match &self.token {
            Some(token) => req.with_bearer(token),
            None => req,
        }
    }
}

/// Collections addressable through the generic `folio_build_*` and
/// `folio_parse_*` entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Collection {
    Artworks,
    Writings,
    Images,
    Contacts,
    NavigationItems,
    SocialLinks,
    Sections,
}

impl Collection {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "artworks" => Collection::Artworks,
            "writings" => Collection::Writings,
            "images" => Collection::Images,
            "contacts" => Collection::Contacts,
            "navigation_items" => Collection::NavigationItems,
            "social_links" => Collection::SocialLinks,
            "sections" => Collection::Sections,
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// `path` is the absolute URL. `body` is null when `body_len` is zero.
/// Free with `folio_free_request`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut u8,
    pub body_len: usize,
}

impl FfiHttpRequest {
    /// Move a core `HttpRequest` onto the heap as an `FfiHttpRequest`.
    ///
    /// Returns null if the URL or a header contains an interior NUL.
    pub(crate) fn from_core(req: folio_core::HttpRequest) -> *mut Self {
        let Some(path) = c_string(req.path) else {
            return std::ptr::null_mut();
        };

        let mut ffi_headers = Vec::with_capacity(req.headers.len());
        for (k, v) in req.headers {
            match (c_string(k), c_string(v)) {
                (Some(key), Some(value)) => ffi_headers.push(FfiHeader { key, value }),
                (key, value) => {
                    free_c_string(key.unwrap_or(std::ptr::null_mut()));
                    free_c_string(value.unwrap_or(std::ptr::null_mut()));
                    free_headers(ffi_headers);
                    free_c_string(path);
                    return std::ptr::null_mut();
                }
            }
        }
        let headers_len = ffi_headers.len() as u32;
        let headers = if ffi_headers.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(ffi_headers.into_boxed_slice()) as *mut FfiHeader
        };

        let (body, body_len) = match req.body {
            Some(bytes) if !bytes.is_empty() => {
                let len = bytes.len();
                (Box::into_raw(bytes.into_boxed_slice()) as *mut u8, len)
            }
            _ => (std::ptr::null_mut(), 0),
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
            headers,
            headers_len,
            body,
            body_len,
        }))
    }
}

/// Release every field of a request allocated by `from_core`.
///
/// # Safety
/// `req` must have come from `FfiHttpRequest::from_core` and not been freed.
pub(crate) unsafe fn free_request(req: Box<FfiHttpRequest>) {
    free_c_string(req.path);
    if !req.headers.is_null() && req.headers_len > 0 {
        let slice = std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize);
        free_headers(unsafe { Box::from_raw(slice) }.into_vec());
    }
    if !req.body.is_null() && req.body_len > 0 {
        let slice = std::ptr::slice_from_raw_parts_mut(req.body, req.body_len);
        drop(unsafe { Box::from_raw(slice) });
    }
}

fn free_headers(headers: Vec<FfiHeader>) {
    for h in headers {
        free_c_string(h.key);
        free_c_string(h.value);
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The caller owns both the struct and `body`; the parse functions only
/// read them. A null `body` is an empty body.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Terminal state of a parse call.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiResultState {
    Success = 0,
    Error = 1,
}

/// Which fault produced an `Error` result. `None` on success.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorKind {
    None = 0,
    Http = 1,
    Transport = 2,
    Deserialization = 3,
    Serialization = 4,
    Panic = 5,
    NullArg = 6,
    InvalidArg = 7,
}

/// Result envelope for every `folio_parse_*` function.
///
/// On success `data` is the payload as a JSON C string and `message` is
/// null. On failure `message` is the user-facing message, `data` is null,
/// and `code` is the HTTP status when `has_code` is true.
#[repr(C)]
pub struct FfiFolioResult {
    pub state: FfiResultState,
    pub error_kind: FfiErrorKind,
    pub has_code: bool,
    pub code: u16,
    pub message: *mut c_char,
    pub data: *mut c_char,
}

impl FfiFolioResult {
    /// Success carrying `value` serialized as JSON.
    pub(crate) fn ok<T: Serialize>(value: &T) -> *mut Self {
        match serde_json::to_string(value) {
            Ok(json) => match c_string(json) {
                Some(data) => Self::boxed(
                    FfiResultState::Success,
                    FfiErrorKind::None,
                    None,
                    std::ptr::null_mut(),
                    data,
                ),
                None => Self::failure(
                    FfiErrorKind::Serialization,
                    None,
                    "payload contains a NUL byte",
                ),
            },
            Err(e) => Self::failure(FfiErrorKind::Serialization, None, &e.to_string()),
        }
    }

    /// Fold an `ApiError` through the same mapping the async repositories use.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let kind = match &err {
            ApiError::Http { .. } => FfiErrorKind::Http,
            ApiError::Transport(_) | ApiError::Store(_) => FfiErrorKind::Transport,
            ApiError::Deserialization(_) => FfiErrorKind::Deserialization,
            ApiError::Serialization(_) => FfiErrorKind::Serialization,
        };
        match Resource::<()>::from(err) {
            Resource::Error { message, code } => Self::failure(kind, code, &message),
            _ => Self::failure(kind, None, folio_core::envelope::UNKNOWN_ERROR),
        }
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorKind::NullArg, None, &format!("null argument: {name}"))
    }

    pub(crate) fn invalid_arg(msg: &str) -> *mut Self {
        Self::failure(FfiErrorKind::InvalidArg, None, msg)
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorKind::Panic, None, msg)
    }

    fn failure(kind: FfiErrorKind, code: Option<u16>, msg: &str) -> *mut Self {
        let message = CString::new(msg.replace('\0', "")).unwrap_or_default().into_raw();
        Self::boxed(FfiResultState::Error, kind, code, message, std::ptr::null_mut())
    }

    fn boxed(
        state: FfiResultState,
        error_kind: FfiErrorKind,
        code: Option<u16>,
        message: *mut c_char,
        data: *mut c_char,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiFolioResult {
            state,
            error_kind,
            has_code: code.is_some(),
            code: code.unwrap_or(0),
            message,
            data,
        }))
    }
}

// ---------------------------------------------------------------------------
// C string helpers
// ---------------------------------------------------------------------------

/// Hand `s` to C. `None` if it contains an interior NUL.
pub(crate) fn c_string(s: String) -> Option<*mut c_char> {
    CString::new(s).ok().map(CString::into_raw)
}

pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}
