// backend/mod.rs - The outbound seam
//
// The dispatcher only knows `Backend`. Production uses `HttpBackend`
// (reqwest); tests plug in a recorder that never touches the network.

mod http;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::Method;
use serde_json::Value;

pub use http::HttpBackend;

/// What gets sent to the backend, fully decided by the dispatcher.
#[derive(Clone)]
pub struct OutboundRequest {
    pub action: &'static str,
    pub method: Method,
    pub url: String,
    pub bearer: String,
    pub body: OutboundBody,
}

impl std::fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("action", &self.action)
            .field("method", &self.method)
            .field("url", &self.url)
            .field("bearer", &"<redacted>")
            .field("body", &self.body)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutboundBody {
    Empty,
    Json(Value),
    /// Bytes forwarded as-is with the caller's Content-Type (boundary included)
    Raw { bytes: Bytes, content_type: String },
}

/// A backend answer of any status. Non-2xx is still a response, not an error.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: u16,
    pub body: Bytes,
}

impl BackendResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The backend never produced an HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },
    #[error("request to {url} failed: {reason}")]
    Other { url: String, reason: String },
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<BackendResponse, TransportError>;
}
