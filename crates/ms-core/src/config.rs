//! Configuration types and parsing for migrasync.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names probed by [`Config::load_from_dir`], in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["migrasync.yml", "migrasync.yaml"];

/// Main project configuration from migrasync.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Directories containing migration definition files
    #[serde(default = "default_migration_paths")]
    pub migration_paths: Vec<String>,

    /// Names of the control tables
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Batch size used by `apply`/`revert` when no limit is given
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default)
    #[default]
    DuckDb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (file-based or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

/// Control table names.
///
/// The defaults match the layout written by earlier releases, so existing
/// databases keep their ledger when the defaults are left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Table holding one row per known migration id
    #[serde(default = "default_migrations_table")]
    pub migrations_table: String,

    /// Singleton table holding the migration-set fingerprint
    #[serde(default = "default_config_table")]
    pub config_table: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            migrations_table: default_migrations_table(),
            config_table: default_config_table(),
        }
    }
}

const DEFAULT_DB_PATH: &str = ":memory:";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_migration_paths() -> Vec<String> {
    vec!["migrations".to_string()]
}

fn default_migrations_table() -> String {
    "_Migrations".to_string()
}

fn default_config_table() -> String {
    "_MigrationsConfig".to_string()
}

fn default_limit() -> usize {
    1
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
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for migrasync.yml or migrasync.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())
            .map(|p| Self::load(&p))
            .unwrap_or_else(|| {
                Err(CoreError::ConfigNotFound {
                    path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
                })
            })
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.migration_paths.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "At least one migration_paths entry must be specified".to_string(),
            });
        }

        if self.default_limit == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "default_limit must be at least 1".to_string(),
            });
        }

        for (key, table) in [
            ("ledger.migrations_table", &self.ledger.migrations_table),
            ("ledger.config_table", &self.ledger.config_table),
        ] {
            if !is_plain_identifier(table) {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "{key} must be a non-empty identifier of letters, digits and '_', got '{table}'"
                    ),
                });
            }
        }

        if self
            .ledger
            .migrations_table
            .eq_ignore_ascii_case(&self.ledger.config_table)
        {
            return Err(CoreError::ConfigInvalid {
                message: "ledger.migrations_table and ledger.config_table must differ"
                    .to_string(),
            });
        }

        Ok(())
    }

    /// Get absolute migration paths relative to a project root
    pub fn migration_paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        self.migration_paths.iter().map(|p| root.join(p)).collect()
    }

    /// Resolve the database path against a project root.
    ///
    /// `:memory:` and absolute paths are returned unchanged.
    pub fn database_path(&self, root: &Path) -> String {
        let path = &self.database.path;
        if path == DEFAULT_DB_PATH || Path::new(path).is_absolute() {
            path.clone()
        } else {
            root.join(path).display().to_string()
        }
    }
}

/// Table names are interpolated into DDL, so only `[A-Za-z0-9_]` is accepted.
fn is_plain_identifier(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
