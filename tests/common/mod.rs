use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use duckdb_proxy::{app, backend::HttpBackend, config::ProxyConfig, AppState};

pub const ADMIN_KEY: &str = "admin-test-key";
pub const CRICKET_TOKEN: &str = "cricket-test-token";
pub const IMDB_TOKEN: &str = "imdb-test-token";

/// One request as the fake backend saw it
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

pub type SeenLog = Arc<Mutex<Vec<Seen>>>;

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub seen: SeenLog,
}

impl TestServer {
    pub fn proxy(&self, query: &str) -> String {
        format!("{}/api/duckdb?{}", self.base_url, query)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

/// Start a fake backend plus the proxy in front of it, all credentials set.
pub async fn start() -> Result<TestServer> {
    start_with(&[]).await
}

/// Same as `start`, with extra env entries layered on top (an empty value
/// unsets a credential).
pub async fn start_with(overrides: &[(&str, &str)]) -> Result<TestServer> {
    let seen: SeenLog = Arc::new(Mutex::new(Vec::new()));
    let backend_url = spawn(fake_backend(seen.clone())).await?;

    let mut env: HashMap<String, String> = HashMap::new();
    env.insert("DUCKDB_BACKEND_URL".into(), backend_url);
    env.insert("DUCKDB_BACKEND_API_KEY".into(), ADMIN_KEY.into());
    env.insert("DUCKDB_CRICKET_READ_TOKEN".into(), CRICKET_TOKEN.into());
    env.insert("DUCKDB_IMDB_READ_TOKEN".into(), IMDB_TOKEN.into());
    for (k, v) in overrides {
        env.insert(k.to_string(), v.to_string());
    }

    let config = ProxyConfig::from_lookup(|key| env.get(key).cloned());
    proxy_for(config, seen).await
}

/// Start only the proxy, pointed at whatever `config` says.
pub async fn proxy_for(config: ProxyConfig, seen: SeenLog) -> Result<TestServer> {
    let backend = HttpBackend::new(Duration::from_secs(5)).context("failed to build backend client")?;
    let base_url = spawn(app(AppState::new(config, Arc::new(backend)))).await?;

    Ok(TestServer {
        base_url,
        client: reqwest::Client::new(),
        seen,
    })
}

async fn spawn(router: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(format!("http://127.0.0.1:{}", port))
}

// ---------------------------------------------------------------------------
// Fake DuckDB backend
// ---------------------------------------------------------------------------

fn fake_backend(seen: SeenLog) -> Router {
    Router::new()
        .route("/api/v1/tables", get(tables))
        .route("/api/v1/schema/:table", get(schema))
        .route("/api/v1/query", post(query))
        // Split backend, one file per dataset
        .route("/api/tables/:file", get(tables))
        .route("/api/schema/:file/:table", get(dataset_schema))
        .route("/api/query/:file", post(query))
        .route("/api/v1/admin/files/:filename/download", get(download))
        .route("/api/v1/admin/upload", post(upload))
        .layer(axum::middleware::from_fn_with_state(seen, record))
}

async fn record(State(seen): State<SeenLog>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.lock().unwrap().push(Seen {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization,
    });
    next.run(request).await
}

async fn tables() -> Json<Value> {
    Json(json!({ "tables": ["matches", "players"] }))
}

async fn schema(Path(table): Path<String>) -> Response {
    if table == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "table not found" }))).into_response();
    }
    Json(json!({
        "table": table,
        "schema": [{ "column_name": "id", "column_type": "INTEGER", "nullable": false }]
    }))
    .into_response()
}

async fn dataset_schema(Path((_file, table)): Path<(String, String)>) -> Response {
    schema(Path(table)).await
}

async fn query(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    // Echo the caller's credential so tests can prove which token arrived
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Json(json!({
        "columns": ["sql", "auth"],
        "rows": [[body["sql"], auth]],
        "row_count": 1,
        "truncated": false
    }))
}

pub const DOWNLOAD_BYTES: &[u8] = b"DUCK\x00\x01\x02\xffbinary-payload";

async fn download(Path(filename): Path<String>) -> Response {
    if filename == "missing.duckdb" {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "File not found" }))).into_response();
    }
    (
        [
            (header::CONTENT_TYPE, "application/x-duckdb"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"internal-storage-name.bin\""),
        ],
        Bytes::from_static(DOWNLOAD_BYTES),
    )
        .into_response()
}

async fn upload(headers: HeaderMap, body: Bytes) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Json(json!({
        "message": "uploaded",
        "content_type": content_type,
        "size_bytes": body.len(),
        "raw": String::from_utf8_lossy(&body),
    }))
}
