// handlers/duckdb.rs - ANY /api/duckdb?action=<name>

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, RawQuery, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::dispatcher::ProxiedRequest;
use crate::AppState;

/// The single proxy entry point. The raw body is taken as bytes so that
/// multipart uploads keep their exact framing and boundary.
pub async fn duckdb_proxy(
    State(state): State<AppState>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request = match body {
        Ok(body) => ProxiedRequest::new(method, query.as_deref(), headers, body),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            ProxiedRequest::with_oversized_body(method, query.as_deref(), headers)
        }
        Err(rejection) => {
            // The caller's stream broke mid-body
            tracing::debug!("Failed to read request body: {}", rejection);
            return rejection.into_response();
        }
    };
    state.dispatcher.dispatch(request).await
}
