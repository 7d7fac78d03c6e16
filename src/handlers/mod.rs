pub mod duckdb;
pub mod health;

pub use duckdb::duckdb_proxy;
pub use health::{health, not_found, root};
