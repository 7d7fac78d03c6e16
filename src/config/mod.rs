use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::actions::{self, CredentialSelector};

/// Backend origin used when `DUCKDB_BACKEND_URL` is not set.
pub const DEFAULT_BACKEND_URL: &str = "https://duckdb-dashboards-backend.tigzig.com";

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub environment: Environment,
    pub backend: BackendConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Where the DuckDB backend lives and the secrets used to talk to it.
/// Read once at startup and never mutated afterwards.
#[derive(Clone, Default)]
pub struct BackendConfig {
    pub base_url: String,
    pub admin_key: String,
    pub per_dataset_read_tokens: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub backend_timeout_secs: u64,
    pub max_request_size_bytes: usize,
    pub enable_request_logging: bool,
}

#[derive(Clone, Default)]
pub struct SecurityConfig {
    /// HS256 secret for the admin role gate. Empty disables the gate.
    pub admin_jwt_secret: String,
}

impl BackendConfig {
    /// Resolve the secret a selector points at. Empty secrets count as absent,
    /// and a missing dataset token never falls back to the admin key.
    pub fn credential(&self, selector: CredentialSelector) -> Option<&str> {
        let secret = match selector {
            CredentialSelector::Admin => Some(self.admin_key.as_str()),
            CredentialSelector::Dataset(name) => {
                self.per_dataset_read_tokens.get(name).map(String::as_str)
            }
        };
        secret.filter(|s| !s.is_empty())
    }

    pub fn has_admin_key(&self) -> bool {
        !self.admin_key.is_empty()
    }

    /// Datasets named by the catalog that have no read token configured.
    pub fn missing_dataset_tokens(&self) -> Vec<&'static str> {
        actions::datasets()
            .into_iter()
            .filter(|name| self.credential(CredentialSelector::Dataset(*name)).is_none())
            .collect()
    }
}

// Secrets never reach logs, even through {:?}.
impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<_> = self.per_dataset_read_tokens.keys().collect();
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("admin_key", &redacted(&self.admin_key))
            .field("per_dataset_read_tokens", &tokens)
            .finish()
    }
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("admin_jwt_secret", &redacted(&self.admin_jwt_secret))
            .finish()
    }
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl ProxyConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Profile defaults first, then specific env vars on top
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        // Backend overrides
        if let Some(v) = non_empty("DUCKDB_BACKEND_URL") {
            self.backend.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = non_empty("DUCKDB_BACKEND_API_KEY").or_else(|| non_empty("DUCKDB_API_KEY")) {
            self.backend.admin_key = v;
        }
        for dataset in actions::datasets() {
            let key = format!("DUCKDB_{}_READ_TOKEN", dataset.to_ascii_uppercase());
            if let Some(v) = non_empty(&key) {
                self.backend.per_dataset_read_tokens.insert(dataset.to_string(), v);
            }
        }

        // API overrides
        if let Some(v) = non_empty("PROXY_BACKEND_TIMEOUT_SECS") {
            self.api.backend_timeout_secs = v.parse().unwrap_or(self.api.backend_timeout_secs);
        }
        if let Some(v) = non_empty("PROXY_MAX_BODY_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Some(v) = non_empty("PROXY_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Some(v) = non_empty("PROXY_ADMIN_JWT_SECRET") {
            self.security.admin_jwt_secret = v;
        }

        self
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.api.backend_timeout_secs)
    }

    fn base(environment: Environment, api: ApiConfig) -> Self {
        Self {
            environment,
            backend: BackendConfig {
                base_url: DEFAULT_BACKEND_URL.to_string(),
                ..BackendConfig::default()
            },
            api,
            security: SecurityConfig::default(),
        }
    }

    fn development() -> Self {
        Self::base(
            Environment::Development,
            ApiConfig {
                backend_timeout_secs: 60,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                enable_request_logging: true,
            },
        )
    }

    fn staging() -> Self {
        Self::base(
            Environment::Staging,
            ApiConfig {
                backend_timeout_secs: 30,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
                enable_request_logging: true,
            },
        )
    }

    fn production() -> Self {
        Self::base(
            Environment::Production,
            ApiConfig {
                backend_timeout_secs: 30,
                // keeps parity with the serverless host's 4.5MB payload cap
                max_request_size_bytes: 4_500_000,
                enable_request_logging: false,
            },
        )
    }
}
