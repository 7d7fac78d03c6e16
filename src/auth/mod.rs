use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

pub const ADMIN_ROLE: &str = "admin";

/// Identity-provider claims. Providers differ on whether roles arrive as a
/// single `role` string or a `roles` array, so both are accepted.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: i64,
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role) || self.roles.iter().any(|r| r == role)
    }
}

/// Server-side check in front of admin-tagged actions.
#[derive(Clone)]
pub struct AdminGuard {
    key: DecodingKey,
}

impl AdminGuard {
    /// `None` when no secret is configured, i.e. admin actions stay open.
    pub fn from_secret(secret: &str) -> Option<Self> {
        if secret.is_empty() {
            return None;
        }
        Some(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn authorize(&self, headers: &HeaderMap) -> Result<Claims, ProxyError> {
        let token = extract_bearer(headers).map_err(ProxyError::Unauthorized)?;

        let claims = decode::<Claims>(&token, &self.key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected admin token: {}", e);
                ProxyError::Unauthorized("Invalid or expired token".to_string())
            })?;

        if !claims.has_role(ADMIN_ROLE) {
            tracing::warn!(sub = %claims.sub, "Admin action attempted without admin role");
            return Err(ProxyError::Forbidden("Admin role required".to_string()));
        }

        Ok(claims)
    }
}

/// Extract the caller's bearer token from the Authorization header
fn extract_bearer(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty bearer token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}
