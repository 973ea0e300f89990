//! Migration descriptors: one named, ordered change with forward and
//! (optionally) reverse procedures.

use serde::Serialize;
use st_core::{compute_checksum, MigrationId};
use st_db::{DbResult, Executor};
use std::fmt;

/// Which way a migration is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Applying `up`
    Up,
    /// Reverting with `down`
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A unit of work run inside a migration's transaction.
///
/// The executor handle is scoped to that transaction; procedures never see a
/// connection they could commit on.
pub trait Procedure: Send + Sync {
    /// Run against the open transaction
    fn run(&self, tx: &dyn Executor) -> DbResult<()>;

    /// Source text of the procedure, if it has one. Used for checksums.
    fn body(&self) -> Option<&str> {
        None
    }
}

/// A procedure defined as a SQL script.
#[derive(Debug, Clone)]
pub struct SqlProcedure {
    sql: String,
}

impl SqlProcedure {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }
}

impl Procedure for SqlProcedure {
    fn run(&self, tx: &dyn Executor) -> DbResult<()> {
        tx.execute_batch(&self.sql)
    }

    fn body(&self) -> Option<&str> {
        Some(&self.sql)
    }
}

impl<F> Procedure for F
where
    F: Fn(&dyn Executor) -> DbResult<()> + Send + Sync,
{
    fn run(&self, tx: &dyn Executor) -> DbResult<()> {
        self(tx)
    }
}

/// The reverse half of a migration.
///
/// Irreversibility is a variant of its own so that rollback has to handle it;
/// a missing `down` can never be mistaken for an empty one.
pub enum Down {
    /// `down` exactly undoes `up`
    Reversible(Box<dyn Procedure>),
    /// No way back; rollback stops here
    Irreversible,
}

impl fmt::Debug for Down {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Down::Reversible(_) => f.write_str("Reversible(..)"),
            Down::Irreversible => f.write_str("Irreversible"),
        }
    }
}

/// One migration: identifier, forward procedure, and reverse procedure.
pub struct Migration {
    id: MigrationId,
    description: Option<String>,
    up: Box<dyn Procedure>,
    down: Down,
    checksum: Option<String>,
}

impl Migration {
    /// Build a migration from arbitrary procedures.
    pub fn new(id: MigrationId, up: impl Procedure + 'static, down: Down) -> Self {
        let checksum = up.body().map(compute_checksum);
        Self {
            id,
            description: None,
            up: Box::new(up),
            down,
            checksum,
        }
    }

    /// A migration whose `down` undoes its `up`.
    pub fn reversible(
        id: MigrationId,
        up: impl Procedure + 'static,
        down: impl Procedure + 'static,
    ) -> Self {
        Self::new(id, up, Down::Reversible(Box::new(down)))
    }

    /// A migration that cannot be rolled back.
    pub fn irreversible(id: MigrationId, up: impl Procedure + 'static) -> Self {
        Self::new(id, up, Down::Irreversible)
    }

    /// A reversible migration from two SQL scripts.
    pub fn sql(id: MigrationId, up: impl Into<String>, down: impl Into<String>) -> Self {
        Self::reversible(id, SqlProcedure::new(up), SqlProcedure::new(down))
    }

    /// Attach a human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &MigrationId {
        &self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// SHA-256 of the `up` body, for SQL-defined migrations.
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    pub fn down(&self) -> &Down {
        &self.down
    }

    pub fn is_reversible(&self) -> bool {
        matches!(self.down, Down::Reversible(_))
    }

    /// Run `up` against an open transaction.
    pub fn apply(&self, tx: &dyn Executor) -> DbResult<()> {
        self.up.run(tx)
    }
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("down", &self.down)
            .field("checksum", &self.checksum)
            .finish()
    }
}

#[cfg(test)]
#[path = "descriptor_test.rs"]
mod tests;
