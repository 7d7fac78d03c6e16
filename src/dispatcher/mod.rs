// dispatcher/mod.rs - Action-keyed request forwarding
//
// One inbound request becomes at most one outbound request. The gates run in
// a fixed order and the first failure ends the request:
//
//   action lookup → credential readiness → method → parameters
//     → admin role (optional) → body size → body → backend call → relay

mod relay;
mod request;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::actions::{self, ActionSpec, BodyMode, PathParam};
use crate::auth::AdminGuard;
use crate::backend::{Backend, OutboundBody, OutboundRequest};
use crate::config::{BackendConfig, ProxyConfig};
use crate::error::ProxyError;

pub use request::ProxiedRequest;

/// Everything decided before the network is touched.
#[derive(Debug)]
pub struct Plan {
    pub spec: &'static ActionSpec,
    pub outbound: OutboundRequest,
    /// Echoed back in Content-Disposition for downloads
    pub filename: Option<String>,
}

#[derive(Clone)]
pub struct Dispatcher {
    backend_config: Arc<BackendConfig>,
    backend: Arc<dyn Backend>,
    admin_guard: Option<AdminGuard>,
    log_requests: bool,
}

impl Dispatcher {
    pub fn new(config: &ProxyConfig, backend: Arc<dyn Backend>) -> Self {
        Self {
            backend_config: Arc::new(config.backend.clone()),
            backend,
            admin_guard: AdminGuard::from_secret(&config.security.admin_jwt_secret),
            log_requests: config.api.enable_request_logging,
        }
    }

    pub async fn dispatch(&self, request: ProxiedRequest) -> Response {
        // Preflight wins over every other check
        if request.method == Method::OPTIONS {
            return StatusCode::OK.into_response();
        }

        match self.forward(&request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(
                    action = request.action().unwrap_or("<none>"),
                    method = %request.method,
                    status = err.status_code().as_u16(),
                    "Request rejected: {}",
                    err
                );
                err.into_response()
            }
        }
    }

    async fn forward(&self, request: &ProxiedRequest) -> Result<Response, ProxyError> {
        let Plan { spec, outbound, filename } = self.plan(request)?;
        let url = outbound.url.clone();

        let response = self.backend.send(outbound).await.map_err(|e| {
            // Full detail stays in the server log; the caller gets the generic shape
            tracing::error!(action = spec.name, url = %url, "Backend request failed: {}", e);
            ProxyError::BackendUnreachable
        })?;

        if self.log_requests {
            tracing::info!(action = spec.name, status = response.status, "Relaying backend response");
        } else {
            tracing::debug!(action = spec.name, status = response.status, "Relaying backend response");
        }

        relay::relay(spec, filename.as_deref(), response)
    }

    /// Run every validation gate and build the outbound request.
    pub fn plan(&self, request: &ProxiedRequest) -> Result<Plan, ProxyError> {
        let name = request.action().ok_or(ProxyError::MissingAction)?;
        let spec = actions::lookup(name).ok_or_else(|| ProxyError::UnknownAction(name.to_string()))?;

        let bearer = self.backend_config.credential(spec.credential).ok_or_else(|| {
            tracing::error!(action = spec.name, "Credential for action is not configured");
            ProxyError::ServerConfiguration
        })?;

        if request.method != spec.method {
            return Err(ProxyError::MethodNotAllowed(spec.method.to_string()));
        }

        let mut values = Vec::with_capacity(spec.params.len());
        for param in spec.params {
            let value = request
                .param(param.name())
                .ok_or(ProxyError::MissingParameter(param.name()))?;
            if !param.accepts(value) {
                return Err(ProxyError::InvalidParameter(param.name()));
            }
            values.push((*param, value));
        }

        if spec.admin {
            if let Some(guard) = &self.admin_guard {
                let claims = guard.authorize(&request.headers)?;
                tracing::info!(action = spec.name, sub = %claims.sub, "Admin action authorized");
            }
        }

        if request.body_too_large {
            return Err(ProxyError::PayloadTooLarge);
        }
        let body = outbound_body(spec, request)?;

        let path = spec.render_path(|param| {
            values
                .iter()
                .find(|(p, _)| *p == param)
                .map(|(_, v)| *v)
                .unwrap_or_default()
        });

        let filename = request.param(PathParam::Filename.name()).map(str::to_string);

        Ok(Plan {
            spec,
            outbound: OutboundRequest {
                action: spec.name,
                method: spec.method.clone(),
                url: format!("{}{}", self.backend_config.base_url, path),
                bearer: bearer.to_string(),
                body,
            },
            filename,
        })
    }
}

fn outbound_body(spec: &ActionSpec, request: &ProxiedRequest) -> Result<OutboundBody, ProxyError> {
    match spec.body {
        BodyMode::None => Ok(OutboundBody::Empty),
        BodyMode::Json => {
            if request.body.iter().all(u8::is_ascii_whitespace) {
                return Ok(OutboundBody::Empty);
            }
            serde_json::from_slice::<Value>(&request.body)
                .map(OutboundBody::Json)
                .map_err(|e| ProxyError::InvalidJson(e.to_string()))
        }
        BodyMode::Multipart => {
            let content_type = request
                .content_type()
                .filter(|ct| ct.to_ascii_lowercase().contains("multipart/form-data"))
                .ok_or(ProxyError::InvalidContentType)?;
            Ok(OutboundBody::Raw {
                bytes: request.body.clone(),
                content_type: content_type.to_string(),
            })
        }
    }
}
