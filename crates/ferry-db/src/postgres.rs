//! PostgreSQL database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use ferry_core::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

/// PostgreSQL database backend
#[derive(Clone)]
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    /// Connect using the `address`, `name`, and credentials from `config`
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        let options = connect_options(config)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", config.describe())))?;
        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Build connection options from the database section of the config
pub fn connect_options(config: &DatabaseConfig) -> DbResult<PgConnectOptions> {
    let (host, port) = config
        .host_port()
        .map_err(|e| DbError::ConfigError(e.to_string()))?;

    let mut options = PgConnectOptions::new()
        .host(&host)
        .port(port)
        .database(&config.name);
    if let Some(username) = &config.username {
        options = options.username(username);
    }
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    Ok(options)
}

#[async_trait]
impl Database for PostgresBackend {
    async fn execute_batch_in_transaction(&self, sql: &str) -> DbResult<()> {
        log::debug!("postgres: BEGIN");
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

        log::debug!("postgres: {sql}");
        let result = sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(sql)).await;
        if let Err(e) = result {
            log::debug!("postgres: ROLLBACK");
            if let Err(rollback_err) = tx.rollback().await {
                log::warn!("postgres: ROLLBACK failed after execution error: {rollback_err}");
            }
            return Err(DbError::ExecutionError(e.to_string()));
        }

        log::debug!("postgres: COMMIT");
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(format!("COMMIT failed: {e}")))
    }

    async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::ConnectionError(format!("health check failed: {e}")))?;
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "postgres"
    }
}
