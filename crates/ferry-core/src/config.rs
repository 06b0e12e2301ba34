//! Configuration types and parsing for ferry.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// File names probed by [`Config::discover`], in order
pub const CONFIG_FILE_NAMES: &[&str] = &["ferry.yml", "ferry.yaml"];

/// Main configuration from ferry.yml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory containing migration files
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// Target database connection
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Rule used to pick the current version among applied upgrades
    #[serde(default)]
    pub version_order: VersionOrder,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            migrations_path: default_migrations_path(),
            database: DatabaseConfig::default(),
            version_order: VersionOrder::default(),
        }
    }
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB file or in-memory database (default)
    #[default]
    DuckDb,
    /// PostgreSQL server
    Postgres,
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
            DbType::Postgres => write!(f, "postgres"),
        }
    }
}

/// How the current version is chosen among successfully applied upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VersionOrder {
    /// Most recently registered upgrade wins (highest surrogate id)
    #[default]
    Insertion,
    /// Highest version number wins; ties broken by surrogate id
    Numeric,
}

impl fmt::Display for VersionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionOrder::Insertion => write!(f, "insertion"),
            VersionOrder::Numeric => write!(f, "numeric"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type (duckdb or postgres)
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// DuckDB database path (or `:memory:`)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// PostgreSQL `host:port`
    #[serde(default = "default_address")]
    pub address: String,

    /// PostgreSQL database name
    #[serde(default = "default_db_name")]
    pub name: String,

    /// PostgreSQL user
    #[serde(default)]
    pub username: Option<String>,

    /// PostgreSQL password
    #[serde(default)]
    pub password: Option<String>,

    /// PostgreSQL pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
            address: default_address(),
            name: default_db_name(),
            username: None,
            password: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_migrations_path() -> String {
    "migrations".to_string()
}

fn default_db_path() -> String {
    "ferry.duckdb".to_string()
}

fn default_address() -> String {
    "localhost:5432".to_string()
}

fn default_db_name() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load ferry.yml / ferry.yaml from `dir`, or fall back to defaults when
    /// neither exists
    pub fn discover(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.exists() {
                log::debug!("Loading config from {}", candidate.display());
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.migrations_path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations_path cannot be empty".to_string(),
            });
        }
        self.database.validate()
    }
}

impl DatabaseConfig {
    /// Validate the settings required by the selected backend
    pub fn validate(&self) -> CoreResult<()> {
        match self.db_type {
            DbType::DuckDb => {
                if self.path.trim().is_empty() {
                    return Err(CoreError::ConfigInvalid {
                        message: "database.path cannot be empty for duckdb".to_string(),
                    });
                }
            }
            DbType::Postgres => {
                self.host_port()?;
                if self.name.trim().is_empty() {
                    return Err(CoreError::ConfigInvalid {
                        message: "database.name cannot be empty for postgres".to_string(),
                    });
                }
                if self.max_connections == 0 {
                    return Err(CoreError::ConfigInvalid {
                        message: "database.max_connections must be at least 1".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Split `address` into host and port
    pub fn host_port(&self) -> CoreResult<(String, u16)> {
        let invalid = || CoreError::ConfigInvalid {
            message: format!(
                "database.address must be 'host:port', found '{}'",
                self.address
            ),
        };
        let (host, port) = self.address.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse::<u16>().map_err(|_| invalid())?;
        Ok((host.to_string(), port))
    }

    /// One-line description of the target with the password masked
    pub fn describe(&self) -> String {
        match self.db_type {
            DbType::DuckDb => format!("duckdb:{}", self.path),
            DbType::Postgres => format!(
                "postgres://{}{}@{}/{}",
                self.username.as_deref().unwrap_or(""),
                if self.password.is_some() { ":****" } else { "" },
                self.address,
                self.name
            ),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
