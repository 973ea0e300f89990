//! Configuration types and parsing for strata.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no `--target` flag is given.
pub const TARGET_ENV_VAR: &str = "STRATA_TARGET";

/// Main project configuration from strata.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Directory holding one sub-directory per migration
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Where applied migrations are recorded
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Refuse to migrate when an applied migration's body has changed on disk
    #[serde(default = "default_true")]
    pub verify_checksums: bool,

    /// Named target configurations (e.g., dev, staging, prod)
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Database connection override
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
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
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (file-based or `:memory:`)
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

/// Ledger table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Table name, optionally schema-qualified (`schema.table`)
    #[serde(default = "default_ledger_table")]
    pub table: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            table: default_ledger_table(),
        }
    }
}

const DEFAULT_DB_PATH: &str = ":memory:";

/// Default ledger table name.
pub const DEFAULT_LEDGER_TABLE: &str = "schema_migrations";

fn default_migrations_path() -> String {
    "migrations".to_string()
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_ledger_table() -> String {
    DEFAULT_LEDGER_TABLE.to_string()
}

fn default_true() -> bool {
    true
}

/// Split a possibly schema-qualified table name into `(schema, table)`.
///
/// Each part must be a non-empty run of ASCII alphanumerics and underscores;
/// returns `None` otherwise. The result is safe to splice into SQL unquoted.
pub fn split_table_name(name: &str) -> Option<(Option<&str>, &str)> {
    let valid = |part: &str| {
        !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    match name.split_once('.') {
        Some((schema, table)) if valid(schema) && valid(table) => Some((Some(schema), table)),
        None if valid(name) => Some((None, name)),
        _ => None,
    }
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
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for strata.yml or strata.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("strata.yml");
        let yaml_path = dir.join("strata.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.migrations_path.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations_path cannot be empty".to_string(),
            });
        }

        if split_table_name(&self.ledger.table).is_none() {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "Invalid ledger table '{}': use letters, digits and underscores, optionally as schema.table",
                    self.ledger.table
                ),
            });
        }

        Ok(())
    }

    /// Absolute path of the migrations directory
    pub fn migrations_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_path)
    }

    /// Names of all configured targets, sorted
    pub fn available_targets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get database configuration, optionally applying target overrides
    ///
    /// If target is specified and exists, uses target's database config.
    /// Otherwise, uses the base database config.
    pub fn get_database_config(&self, target: Option<&str>) -> CoreResult<DatabaseConfig> {
        match target {
            Some(name) => {
                let target_config =
                    self.targets
                        .get(name)
                        .ok_or_else(|| CoreError::ConfigInvalid {
                            message: format!(
                                "Target '{}' not found. Available targets: {}",
                                name,
                                self.available_targets().join(", ")
                            ),
                        })?;

                Ok(target_config
                    .database
                    .clone()
                    .unwrap_or_else(|| self.database.clone()))
            }
            None => Ok(self.database.clone()),
        }
    }

    /// Resolve target from CLI flag or STRATA_TARGET environment variable
    ///
    /// Priority: CLI flag > STRATA_TARGET env var > None
    pub fn resolve_target(cli_target: Option<&str>) -> Option<String> {
        cli_target
            .map(String::from)
            .or_else(|| std::env::var(TARGET_ENV_VAR).ok())
            .filter(|t| !t.is_empty())
    }
}

/// A loaded project: its root directory and parsed configuration.
#[derive(Debug, Clone)]
pub struct Project {
    /// Absolute project root
    pub root: PathBuf,
    /// Parsed `strata.yml`
    pub config: Config,
}

impl Project {
    /// Load a project from `dir`, reading `config_file` instead of the
    /// default `strata.yml` when given (relative paths resolve against `dir`).
    pub fn load(dir: &Path, config_file: Option<&Path>) -> CoreResult<Self> {
        let root = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir()?.join(dir)
        };

        if !root.exists() {
            return Err(CoreError::ProjectNotFound {
                path: root.display().to_string(),
            });
        }

        let config = match config_file {
            Some(file) => Config::load(&root.join(file))?,
            None => Config::load_from_dir(&root)?,
        };
        log::debug!("Loaded project '{}' from {}", config.name, root.display());

        Ok(Self { root, config })
    }

    /// Absolute path of the migrations directory
    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_path_absolute(&self.root)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
