use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use super::{Backend, BackendResponse, OutboundBody, OutboundRequest, TransportError};

/// reqwest-backed client. One instance is shared by every request; the
/// underlying connection pool is safe for concurrent use.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
}

impl HttpBackend {
    /// `timeout` bounds connecting and each individual read. There is no
    /// whole-request cap, so a large download that keeps making progress is
    /// never cut off partway.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .user_agent(concat!("duckdb-proxy/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    fn classify(url: &str, err: reqwest::Error) -> TransportError {
        let url = url.to_string();
        if err.is_timeout() {
            TransportError::Timeout { url }
        } else if err.is_connect() {
            TransportError::Connect { url, reason: err.to_string() }
        } else {
            TransportError::Other { url, reason: err.to_string() }
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn send(&self, request: OutboundRequest) -> Result<BackendResponse, TransportError> {
        let OutboundRequest { method, url, bearer, body, .. } = request;

        let mut builder = self
            .client
            .request(method, &url)
            .header(AUTHORIZATION, format!("Bearer {}", bearer));

        builder = match body {
            OutboundBody::Empty => builder.header(CONTENT_TYPE, "application/json"),
            OutboundBody::Json(value) => builder.json(&value),
            OutboundBody::Raw { bytes, content_type } => {
                builder.header(CONTENT_TYPE, content_type).body(bytes)
            }
        };

        let response = builder.send().await.map_err(|e| Self::classify(&url, e))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| Self::classify(&url, e))?;

        Ok(BackendResponse { status, body })
    }
}
