use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use serde_json::Value;

use crate::backend::{Backend, BackendResponse, OutboundRequest, TransportError};
use crate::config::{ApiConfig, BackendConfig, Environment, ProxyConfig, SecurityConfig};

/// Canned backend behaviour for unit tests
#[derive(Debug, Clone)]
pub enum Reply {
    Json(u16, Value),
    Raw(u16, Bytes),
    ConnectionRefused,
}

/// A `Backend` that records every request and never touches the network.
pub struct RecordingBackend {
    reply: Reply,
    calls: Mutex<Vec<OutboundRequest>>,
}

impl RecordingBackend {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn ok() -> Arc<Self> {
        Self::new(Reply::Json(200, serde_json::json!({ "ok": true })))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<OutboundRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last(&self) -> OutboundRequest {
        self.calls().pop().expect("backend was never called")
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn send(&self, request: OutboundRequest) -> Result<BackendResponse, TransportError> {
        let url = request.url.clone();
        self.calls.lock().unwrap().push(request);

        match &self.reply {
            Reply::Json(status, value) => Ok(BackendResponse {
                status: *status,
                body: Bytes::from(serde_json::to_vec(value).unwrap()),
            }),
            Reply::Raw(status, body) => Ok(BackendResponse {
                status: *status,
                body: body.clone(),
            }),
            Reply::ConnectionRefused => Err(TransportError::Connect {
                url,
                reason: "tcp connect error: Connection refused (os error 111)".to_string(),
            }),
        }
    }
}

/// A config with every credential filled in.
pub fn full_config() -> ProxyConfig {
    let mut tokens = HashMap::new();
    tokens.insert("cricket".to_string(), "cricket-read".to_string());
    tokens.insert("imdb".to_string(), "imdb-read".to_string());

    ProxyConfig {
        environment: Environment::Development,
        backend: BackendConfig {
            base_url: "http://backend.test".to_string(),
            admin_key: "admin-key".to_string(),
            per_dataset_read_tokens: tokens,
        },
        api: ApiConfig {
            backend_timeout_secs: 5,
            max_request_size_bytes: 1024 * 1024,
            enable_request_logging: false,
        },
        security: SecurityConfig::default(),
    }
}

/// A config with no credentials at all.
pub fn empty_config() -> ProxyConfig {
    let mut config = full_config();
    config.backend.admin_key.clear();
    config.backend.per_dataset_read_tokens.clear();
    config
}
