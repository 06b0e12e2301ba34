//! Runtime context for CLI commands

use anyhow::{Context, Result};
use ferry_core::{Config, DbType};
use ferry_db::{Database, DuckDbBackend, PostgresBackend};
use ferry_engine::MigrationContext;
use ferry_ledger::{DuckDbLedger, Ledger, PgLedger};
use std::path::Path;
use std::sync::Arc;

use crate::cli::{DbTypeArg, GlobalArgs};

/// A connected, health-checked migration context built from the effective
/// configuration
pub struct RuntimeContext {
    /// Collaborators handed to the engine
    pub migration: MigrationContext,
}

impl RuntimeContext {
    /// Load config, connect, check health and prepare the ledger table
    pub async fn new(global: &GlobalArgs) -> Result<Self> {
        let config = load_config(global)?;
        log::info!(
            "Using {} with migrations from {} (version order: {})",
            config.database.describe(),
            config.migrations_path,
            config.version_order
        );

        let (db, ledger) = connect(&config).await?;
        db.health_check()
            .await
            .context("Database health check failed")?;
        ledger
            .ensure_schema()
            .await
            .context("Failed to create the schema_migrations table")?;

        let migration = MigrationContext::new(db, ledger, &config.migrations_path)
            .with_version_order(config.version_order);
        Ok(Self { migration })
    }
}

/// Resolve the effective configuration: file (or defaults), then flags
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = match &global.config {
        Some(path) => {
            Config::load(Path::new(path)).context("Failed to load configuration file")?
        }
        None => Config::discover(Path::new(".")).context("Failed to load configuration")?,
    };
    apply_overrides(&mut config, global);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, global: &GlobalArgs) {
    if let Some(dir) = &global.migrations_dir {
        config.migrations_path = dir.clone();
    }
    if let Some(db_type) = global.db_type {
        config.database.db_type = match db_type {
            DbTypeArg::Duckdb => DbType::DuckDb,
            DbTypeArg::Postgres => DbType::Postgres,
        };
    }
    if let Some(target) = &global.target {
        config.database.path = target.clone();
    }
    if let Some(address) = &global.address {
        config.database.address = address.clone();
    }
    if let Some(name) = &global.database {
        config.database.name = name.clone();
    }
    if global.username.is_some() {
        config.database.username = global.username.clone();
    }
    if global.password.is_some() {
        config.database.password = global.password.clone();
    }
}

async fn connect(config: &Config) -> Result<(Arc<dyn Database>, Arc<dyn Ledger>)> {
    match config.database.db_type {
        DbType::DuckDb => {
            let backend = DuckDbBackend::new(&config.database.path)
                .context("Failed to open DuckDB database")?;
            let ledger: Arc<dyn Ledger> = Arc::new(DuckDbLedger::new(
                backend
                    .try_clone_connection()
                    .context("Failed to open ledger connection")?,
            ));
            let db: Arc<dyn Database> = Arc::new(backend);
            Ok((db, ledger))
        }
        DbType::Postgres => {
            let backend = PostgresBackend::connect(&config.database)
                .await
                .context("Failed to connect to PostgreSQL")?;
            let ledger: Arc<dyn Ledger> = Arc::new(PgLedger::new(backend.pool().clone()));
            let db: Arc<dyn Database> = Arc::new(backend);
            Ok((db, ledger))
        }
    }
}
