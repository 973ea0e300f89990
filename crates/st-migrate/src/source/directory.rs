//! Migrations discovered on disk.
//!
//! Layout, one directory per migration:
//!
//! ```text
//! migrations/
//!   20240105120000_create_locations/
//!     up.sql
//!     down.sql
//!   20240212093000_drop_legacy_scores/
//!     up.sql
//!     migration.yml      # irreversible: true
//! ```

use super::{Catalogue, MigrationSource};
use crate::descriptor::{Down, Migration, SqlProcedure};
use crate::error::{MigrateError, MigrateResult};
use serde::Deserialize;
use st_core::MigrationId;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const UP_FILE: &str = "up.sql";
const DOWN_FILE: &str = "down.sql";
const META_FILES: [&str; 2] = ["migration.yml", "migration.yaml"];

/// Optional per-migration metadata from `migration.yml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MigrationMeta {
    #[serde(default)]
    description: Option<String>,
    /// Must be set for a migration without `down.sql`
    #[serde(default)]
    irreversible: bool,
}

/// Scans a directory for migration sub-directories.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MigrationSource for DirectorySource {
    fn list(&self) -> MigrateResult<Catalogue> {
        if !self.dir.exists() {
            log::debug!(
                "Migrations directory {} does not exist; nothing to load",
                self.dir.display()
            );
            return Catalogue::new(Vec::new());
        }

        let mut migrations = Vec::new();
        for entry in read_dir_sorted(&self.dir)? {
            if is_hidden(&entry) {
                continue;
            }
            if !entry.is_dir() {
                log::debug!("Ignoring non-directory {}", entry.display());
                continue;
            }
            let name = entry
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| MigrateError::Discovery {
                    message: format!(
                        "{}: migration directory name is not valid UTF-8",
                        entry.display()
                    ),
                })?;
            let id = MigrationId::parse(name).map_err(|e| MigrateError::Discovery {
                message: format!("{}: {e}", entry.display()),
            })?;
            migrations.push(Arc::new(load_migration(&entry, id)?));
        }

        log::debug!(
            "Discovered {} migration(s) in {}",
            migrations.len(),
            self.dir.display()
        );
        Catalogue::new(migrations)
    }
}

fn discovery_io(path: &Path, e: std::io::Error) -> MigrateError {
    MigrateError::Discovery {
        message: format!("cannot read {}: {e}", path.display()),
    }
}

fn read_dir_sorted(dir: &Path) -> MigrateResult<Vec<PathBuf>> {
    let mut paths = std::fs::read_dir(dir)
        .map_err(|e| discovery_io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| discovery_io(dir, e))?;
    paths.sort();
    Ok(paths)
}

/// Entries whose name starts with `.` are skipped everywhere.
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
}

fn read_optional(path: &Path) -> MigrateResult<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    std::fs::read_to_string(path)
        .map(Some)
        .map_err(|e| discovery_io(path, e))
}

fn load_meta(dir: &Path) -> MigrateResult<MigrationMeta> {
    let present: Vec<PathBuf> = META_FILES
        .iter()
        .map(|f| dir.join(f))
        .filter(|p| p.exists())
        .collect();

    match present.as_slice() {
        [] => Ok(MigrationMeta::default()),
        [path] => {
            let content = read_optional(path)?.unwrap_or_default();
            if content.trim().is_empty() {
                return Ok(MigrationMeta::default());
            }
            serde_yaml::from_str(&content).map_err(|e| MigrateError::Discovery {
                message: format!("invalid {}: {e}", path.display()),
            })
        }
        _ => Err(MigrateError::Discovery {
            message: format!(
                "{} has both migration.yml and migration.yaml",
                dir.display()
            ),
        }),
    }
}

fn load_migration(dir: &Path, id: MigrationId) -> MigrateResult<Migration> {
    let unexpected: Vec<String> = read_dir_sorted(dir)?
        .iter()
        .filter(|p| !is_hidden(p))
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .filter(|n| n != UP_FILE && n != DOWN_FILE && !META_FILES.contains(&n.as_str()))
        .collect();
    if !unexpected.is_empty() {
        return Err(MigrateError::Discovery {
            message: format!(
                "migration '{id}' contains unexpected files: {}",
                unexpected.join(", ")
            ),
        });
    }

    let Some(up) = read_optional(&dir.join(UP_FILE))? else {
        return Err(MigrateError::Discovery {
            message: format!("migration '{id}' has no {UP_FILE}"),
        });
    };
    if up.trim().is_empty() {
        return Err(MigrateError::Discovery {
            message: format!("migration '{id}' has an empty {UP_FILE}"),
        });
    }

    let meta = load_meta(dir)?;
    let down = match (read_optional(&dir.join(DOWN_FILE))?, meta.irreversible) {
        (Some(sql), false) => Down::Reversible(Box::new(SqlProcedure::new(sql))),
        (None, true) => Down::Irreversible,
        (Some(_), true) => {
            return Err(MigrateError::Discovery {
                message: format!(
                    "migration '{id}' is marked irreversible but also has a {DOWN_FILE}"
                ),
            })
        }
        (None, false) => {
            return Err(MigrateError::Discovery {
                message: format!(
                    "migration '{id}' has no {DOWN_FILE}; add one or set `irreversible: true` in migration.yml"
                ),
            })
        }
    };

    let migration = Migration::new(id, SqlProcedure::new(up), down);
    Ok(match meta.description {
        Some(description) => migration.with_description(description),
        None => migration,
    })
}

#[cfg(test)]
#[path = "directory_test.rs"]
mod tests;
