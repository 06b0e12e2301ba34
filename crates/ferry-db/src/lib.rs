//! ferry-db - Database abstraction layer for Ferry
//!
//! This crate provides the `Database` trait used to run a migration's
//! statement batch atomically, with implementations for DuckDB and
//! PostgreSQL.

pub mod duckdb;
pub mod error;
pub mod postgres;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use postgres::{connect_options, PostgresBackend};
pub use traits::Database;
