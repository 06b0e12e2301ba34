//! ferry-core - Core library for Ferry
//!
//! This crate provides the migration domain types, the filename reader,
//! content fingerprinting, and configuration parsing shared by every Ferry
//! component.

pub mod checksum;
pub mod config;
pub mod error;
pub mod migration;
pub mod reader;

pub use checksum::compute_fingerprint;
pub use config::{Config, DatabaseConfig, DbType, VersionOrder};
pub use error::{CoreError, CoreResult};
pub use migration::{
    canonical_file_name, Direction, MigrationDescriptor, MigrationRecord, MigrationStatus,
    Outcome,
};
pub use reader::{parse_file_name, read_migration, relative_source_path, ParsedFileName};
