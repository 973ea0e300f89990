//! Migrations compiled into the binary.

use super::{Catalogue, MigrationSource};
use crate::descriptor::Migration;
use crate::error::MigrateResult;
use std::sync::Arc;

/// An in-memory list of migrations, typically built at startup from code or
/// `include_str!`-embedded SQL.
#[derive(Debug, Default, Clone)]
pub struct RegistrySource {
    migrations: Vec<Arc<Migration>>,
}

impl RegistrySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a migration. Registration order does not matter.
    pub fn register(&mut self, migration: Migration) -> &mut Self {
        self.migrations.push(Arc::new(migration));
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, migration: Migration) -> Self {
        self.register(migration);
        self
    }
}

impl FromIterator<Migration> for RegistrySource {
    fn from_iter<I: IntoIterator<Item = Migration>>(iter: I) -> Self {
        Self {
            migrations: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

impl MigrationSource for RegistrySource {
    fn list(&self) -> MigrateResult<Catalogue> {
        Catalogue::new(self.migrations.clone())
    }
}
