use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::{header::CONTENT_TYPE, HeaderMap, Method};

/// One inbound call, as the dispatcher sees it. Lives for a single
/// request/response cycle.
#[derive(Debug, Clone)]
pub struct ProxiedRequest {
    pub method: Method,
    pub params: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// The body went over the size limit and was dropped unread
    pub body_too_large: bool,
}

impl ProxiedRequest {
    pub fn new(method: Method, query: Option<&str>, headers: HeaderMap, body: Bytes) -> Self {
        // First occurrence wins when a key repeats
        let mut params = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }

        Self {
            method,
            params,
            headers,
            body,
            body_too_large: false,
        }
    }

    /// A request whose body was refused by the size limit. It still runs the
    /// action and parameter gates so the caller gets the most specific error.
    pub fn with_oversized_body(method: Method, query: Option<&str>, headers: HeaderMap) -> Self {
        Self {
            body_too_large: true,
            ..Self::new(method, query, headers, Bytes::new())
        }
    }

    /// A query parameter, treating an empty value the same as an absent one.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn action(&self) -> Option<&str> {
        self.param("action")
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}
