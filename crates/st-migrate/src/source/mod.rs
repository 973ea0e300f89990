//! Migration sources: where descriptors come from.
//!
//! A source only has to produce migrations; [`Catalogue::new`] is what sorts
//! them and rejects ambiguity, so every source gets the same guarantees.

mod directory;
mod registry;

pub use directory::DirectorySource;
pub use registry::RegistrySource;

use crate::descriptor::Migration;
use crate::error::{MigrateError, MigrateResult};
use st_core::MigrationId;
use std::collections::HashMap;
use std::sync::Arc;

/// Anything that can list the available migrations.
pub trait MigrationSource {
    /// All known migrations, sorted ascending by identifier.
    ///
    /// Fails with [`MigrateError::Discovery`] when two migrations share an
    /// identifier or a migration cannot be loaded.
    fn list(&self) -> MigrateResult<Catalogue>;
}

/// The ordered, duplicate-free set of migrations a source produced.
#[derive(Debug, Default, Clone)]
pub struct Catalogue {
    migrations: Vec<Arc<Migration>>,
    index: HashMap<MigrationId, usize>,
}

impl Catalogue {
    /// Sort `migrations` by identifier, failing on duplicates.
    pub fn new(mut migrations: Vec<Arc<Migration>>) -> MigrateResult<Self> {
        migrations.sort_by(|a, b| a.id().cmp(b.id()));

        let mut duplicates: Vec<&str> = migrations
            .windows(2)
            .filter(|pair| pair[0].id() == pair[1].id())
            .map(|pair| pair[0].id().as_str())
            .collect();
        if !duplicates.is_empty() {
            duplicates.dedup();
            return Err(MigrateError::Discovery {
                message: format!("duplicate migration identifiers: {}", duplicates.join(", ")),
            });
        }

        let index = migrations
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id().clone(), i))
            .collect();
        Ok(Self { migrations, index })
    }

    /// Look a migration up by identifier.
    pub fn get(&self, id: &str) -> Option<&Arc<Migration>> {
        self.index.get(id).map(|&i| &self.migrations[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Migrations in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Migration>> {
        self.migrations.iter()
    }

    /// Identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &MigrationId> {
        self.migrations.iter().map(|m| m.id())
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
