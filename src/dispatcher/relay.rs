use axum::http::{
    header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    HeaderValue, StatusCode,
};
use axum::response::{IntoResponse, Response};

use crate::actions::{ActionSpec, ResponseMode};
use crate::backend::BackendResponse;
use crate::error::ProxyError;

/// Turn a backend answer into the caller's response.
///
/// JSON bodies are passed through byte-for-byte under the backend's status.
/// A body that is not JSON counts as a failed fetch, same as a transport
/// error. Binary success bodies go out as an attachment named after what the
/// caller asked for.
pub fn relay(
    spec: &ActionSpec,
    filename: Option<&str>,
    response: BackendResponse,
) -> Result<Response, ProxyError> {
    let status = StatusCode::from_u16(response.status).map_err(|_| {
        tracing::error!(action = spec.name, status = response.status, "Backend returned an invalid status code");
        ProxyError::BackendUnreachable
    })?;

    match spec.response {
        ResponseMode::Binary if response.is_success() => {
            let disposition = content_disposition(filename.unwrap_or("download"));
            Ok((
                status,
                [
                    (CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
                    (CONTENT_DISPOSITION, disposition),
                ],
                response.body,
            )
                .into_response())
        }
        // Failed downloads carry a JSON error like everything else
        ResponseMode::Binary | ResponseMode::Json => {
            if let Err(e) = serde_json::from_slice::<serde::de::IgnoredAny>(&response.body) {
                tracing::error!(
                    action = spec.name,
                    status = response.status,
                    "Backend response was not valid JSON: {}",
                    e
                );
                return Err(ProxyError::BackendUnreachable);
            }
            Ok((
                status,
                [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                response.body,
            )
                .into_response())
        }
    }
}

/// `attachment; filename="<name>"`, echoing the requested name. Quotes and
/// backslashes are escaped and control characters dropped so the value is
/// always a legal header.
pub fn content_disposition(filename: &str) -> HeaderValue {
    let mut escaped = String::with_capacity(filename.len());
    for c in filename.chars().filter(|c| !c.is_control()) {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    HeaderValue::from_bytes(format!("attachment; filename=\"{}\"", escaped).as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
