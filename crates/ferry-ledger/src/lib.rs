//! ferry-ledger - Persistent migration ledger
//!
//! The ledger is the `schema_migrations` table. It records every registered
//! migration file once and the outcome of its single execution attempt.

pub(crate) mod ddl;
pub mod duckdb;
pub mod error;
pub mod postgres;
pub(crate) mod row;
pub mod traits;

pub use duckdb::DuckDbLedger;
pub use error::{LedgerError, LedgerResult};
pub use postgres::PgLedger;
pub use traits::{Ledger, SortOrder};
