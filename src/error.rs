// Proxy error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// Every way a request can be turned away before (or instead of) a backend
/// response being relayed. Backend HTTP errors are not represented here:
/// those are relayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    // 400 Bad Request
    MissingAction,
    UnknownAction(String),
    MissingParameter(&'static str),
    InvalidParameter(&'static str),
    InvalidContentType,
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 413 Payload Too Large
    PayloadTooLarge,

    // 500 Internal Server Error
    ServerConfiguration,
    BackendUnreachable,
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MissingAction
            | ProxyError::UnknownAction(_)
            | ProxyError::MissingParameter(_)
            | ProxyError::InvalidParameter(_)
            | ProxyError::InvalidContentType
            | ProxyError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ProxyError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ProxyError::Forbidden(_) => StatusCode::FORBIDDEN,
            ProxyError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::ServerConfiguration | ProxyError::BackendUnreachable => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-safe message. The two 500s are constant strings so they say
    /// nothing about which secret is missing or what the transport hit.
    pub fn message(&self) -> String {
        match self {
            ProxyError::MissingAction => "Missing action parameter".to_string(),
            ProxyError::UnknownAction(action) => format!("Unknown action: {}", action),
            ProxyError::MissingParameter(name) => format!("Missing {} parameter", name),
            ProxyError::InvalidParameter(name) => format!("Invalid {} parameter", name),
            ProxyError::InvalidContentType => "Content-Type must be multipart/form-data".to_string(),
            ProxyError::InvalidJson(msg) => format!("Invalid JSON body: {}", msg),
            ProxyError::Unauthorized(msg) => msg.clone(),
            ProxyError::Forbidden(msg) => msg.clone(),
            ProxyError::MethodNotAllowed(method) => format!("{} required for this action", method),
            ProxyError::PayloadTooLarge => "Request body too large".to_string(),
            ProxyError::ServerConfiguration => "Server configuration error".to_string(),
            ProxyError::BackendUnreachable => "Failed to connect to backend".to_string(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ProxyError::MissingAction => "MISSING_ACTION",
            ProxyError::UnknownAction(_) => "UNKNOWN_ACTION",
            ProxyError::MissingParameter(_) => "MISSING_PARAMETER",
            ProxyError::InvalidParameter(_) => "INVALID_PARAMETER",
            ProxyError::InvalidContentType => "INVALID_CONTENT_TYPE",
            ProxyError::InvalidJson(_) => "INVALID_JSON",
            ProxyError::Unauthorized(_) => "UNAUTHORIZED",
            ProxyError::Forbidden(_) => "FORBIDDEN",
            ProxyError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ProxyError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ProxyError::ServerConfiguration => "SERVER_CONFIGURATION_ERROR",
            ProxyError::BackendUnreachable => "BACKEND_UNREACHABLE",
        }
    }

    /// `error` carries the message because that is the field the frontend displays.
    pub fn to_json(&self) -> Value {
        json!({
            "error": self.message(),
            "code": self.error_code()
        })
    }
}

impl std::fmt::Display for ProxyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ProxyError {}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
