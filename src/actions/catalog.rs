use axum::http::Method;

use super::{ActionSpec, BodyMode, CredentialSelector, PathParam, ResponseMode};

const NONE: &[PathParam] = &[];
const TABLE: &[PathParam] = &[PathParam::Table];
const FILENAME: &[PathParam] = &[PathParam::Filename];
const FILENAME_TABLE: &[PathParam] = &[PathParam::Filename, PathParam::Table];

macro_rules! action {
    ($name:literal, $method:ident, $path:literal, $params:expr, $credential:expr, $body:ident, $response:ident, admin = $admin:literal) => {
        ActionSpec {
            name: $name,
            method: Method::$method,
            path: $path,
            params: $params,
            credential: $credential,
            body: BodyMode::$body,
            response: ResponseMode::$response,
            admin: $admin,
        }
    };
}

const ADMIN: CredentialSelector = CredentialSelector::Admin;
const CRICKET: CredentialSelector = CredentialSelector::Dataset("cricket");
const IMDB: CredentialSelector = CredentialSelector::Dataset("imdb");

pub static CATALOG: &[ActionSpec] = &[
    // Active dataset
    action!("tables", GET, "/api/v1/tables", NONE, ADMIN, None, Json, admin = false),
    action!("schema", GET, "/api/v1/schema/{table}", TABLE, ADMIN, None, Json, admin = false),
    action!("query", POST, "/api/v1/query", NONE, ADMIN, Json, Json, admin = false),
    // Per-dataset, read-only tokens. These live on the split backend's
    // unversioned routes.
    action!("cricket-tables", GET, "/api/tables/cricket.duckdb", NONE, CRICKET, None, Json, admin = false),
    action!("cricket-schema", GET, "/api/schema/cricket.duckdb/{table}", TABLE, CRICKET, None, Json, admin = false),
    action!("cricket-query", POST, "/api/query/cricket.duckdb", NONE, CRICKET, Json, Json, admin = false),
    action!("imdb-tables", GET, "/api/tables/imdb.duckdb", NONE, IMDB, None, Json, admin = false),
    action!("imdb-schema", GET, "/api/schema/imdb.duckdb/{table}", TABLE, IMDB, None, Json, admin = false),
    action!("imdb-query", POST, "/api/query/imdb.duckdb", NONE, IMDB, Json, Json, admin = false),
    // File administration
    action!("admin-files", GET, "/api/v1/admin/files", NONE, ADMIN, None, Json, admin = true),
    action!("admin-preview", GET, "/api/v1/admin/files/{filename}/preview", FILENAME, ADMIN, None, Json, admin = true),
    action!("admin-delete", DELETE, "/api/v1/admin/files/{filename}", FILENAME, ADMIN, None, Json, admin = true),
    action!("admin-rename", PUT, "/api/v1/admin/files/{filename}/rename", FILENAME, ADMIN, Json, Json, admin = true),
    action!("admin-refresh", POST, "/api/v1/admin/files/{filename}/refresh", FILENAME, ADMIN, Json, Json, admin = true),
    action!("admin-download", GET, "/api/v1/admin/files/{filename}/download", FILENAME, ADMIN, None, Binary, admin = true),
    action!("admin-table-rename", PUT, "/api/v1/admin/files/{filename}/tables/{table}/rename", FILENAME_TABLE, ADMIN, Json, Json, admin = true),
    action!("admin-table-delete", DELETE, "/api/v1/admin/files/{filename}/tables/{table}", FILENAME_TABLE, ADMIN, None, Json, admin = true),
    action!("admin-upload", POST, "/api/v1/admin/upload", NONE, ADMIN, Multipart, Json, admin = true),
    action!("admin-upload-token", POST, "/api/v1/admin/upload-token", NONE, ADMIN, Json, Json, admin = true),
    action!("admin-share", POST, "/api/v1/admin/files/{filename}/share", FILENAME, ADMIN, Json, Json, admin = true),
    action!("admin-unshare", DELETE, "/api/v1/admin/files/{filename}/share", FILENAME, ADMIN, None, Json, admin = true),
];
