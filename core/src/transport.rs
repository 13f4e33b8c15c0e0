//! Executes `HttpRequest` values against the network.
//!
//! The trait is the seam between the deterministic build/parse half of the
//! core and real I/O. `ReqwestTransport` is the production adapter; tests
//! substitute scripted transports.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// One HTTP round-trip.
///
/// Implementations return `Ok` for every response that arrived, whatever its
/// status; status interpretation belongs to `FolioClient::parse_*`. `Err` is
/// reserved for faults with no response (`ApiError::Transport`).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use async_trait::async_trait;
    use reqwest::{Client, Method};

    use super::Transport;
    use crate::error::ApiError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Reqwest-backed transport. Timeouts are the client's defaults.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        client: Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Use a preconfigured client (proxy, TLS roots, ...).
        pub fn with_client(client: Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            let method = match request.method {
                HttpMethod::Get => Method::GET,
                HttpMethod::Post => Method::POST,
                HttpMethod::Put => Method::PUT,
                HttpMethod::Delete => Method::DELETE,
            };
            let mut builder = self.client.request(method, &request.path);
            for (key, value) in &request.headers {
                builder = builder.header(key.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(map_transport_error)?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| {
                    v.to_str()
                        .ok()
                        .map(|v| (k.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response.text().await.map_err(map_transport_error)?;
            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    fn map_transport_error(error: reqwest::Error) -> ApiError {
        ApiError::Transport(error.to_string())
    }
}
