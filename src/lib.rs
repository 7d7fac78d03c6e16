pub mod actions;
pub mod auth;
pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod middleware;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::backend::Backend;
use crate::config::ProxyConfig;
use crate::dispatcher::Dispatcher;

/// Shared per-process state. Everything in here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: ProxyConfig, backend: Arc<dyn Backend>) -> Self {
        let dispatcher = Dispatcher::new(&config, backend);
        Self {
            config: Arc::new(config),
            dispatcher,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;

    Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/test", get(handlers::health))
        // Proxy
        .route("/api/duckdb", any(handlers::duckdb_proxy))
        .fallback(handlers::not_found)
        .with_state(state)
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(middleware::cors_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Log which credential kinds are missing. Startup continues either way;
/// only the actions needing a missing secret will fail.
pub fn log_config_warnings(config: &ProxyConfig) {
    if !config.backend.has_admin_key() {
        tracing::warn!("Admin backend key is not configured; admin and generic query actions will return 500");
    }
    for dataset in config.backend.missing_dataset_tokens() {
        tracing::warn!(dataset, "Dataset read token is not configured; its actions will return 500");
    }
    if config.security.admin_jwt_secret.is_empty() {
        tracing::warn!("Admin role gate is disabled; admin actions are not checked server-side");
    }
}
