// handlers/health.rs - GET /, GET /health, GET /api/test

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Map, Value};

use crate::actions::{self, CredentialSelector};
use crate::AppState;

fn presence(configured: bool) -> &'static str {
    if configured {
        "configured"
    } else {
        "missing"
    }
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "DuckDB Dashboards Proxy",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "proxy": "/api/duckdb?action=<name>",
            "health": "/health",
        }
    }))
}

/// Liveness plus which secrets are present. Reports presence only, never values.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let backend = &state.config.backend;

    let mut datasets = Map::new();
    for name in actions::datasets() {
        let configured = backend.credential(CredentialSelector::Dataset(name)).is_some();
        datasets.insert(name.to_string(), Value::from(presence(configured)));
    }

    let admin_gate = if state.config.security.admin_jwt_secret.is_empty() {
        "disabled"
    } else {
        "enabled"
    };

    Json(json!({
        "message": "Proxy is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": state.config.environment,
        "envCheck": {
            "backendUrl": presence(!backend.base_url.is_empty()),
            "apiKey": presence(backend.has_admin_key()),
            "datasetTokens": datasets,
            "adminGate": admin_gate,
        }
    }))
}

pub async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "code": "NOT_FOUND"
        })),
    )
}
