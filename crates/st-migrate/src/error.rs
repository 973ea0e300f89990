//! Error types for the migration engine.

use crate::descriptor::Direction;
use st_core::MigrationId;
use st_db::DbError;
use thiserror::Error;

/// Migration engine errors.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// The source could not produce an unambiguous catalogue (MG001).
    #[error("[MG001] Migration discovery failed: {message}")]
    Discovery { message: String },

    /// The ledger already holds an entry for this migration (MG002).
    #[error("[MG002] Ledger already records migration '{id}' as applied (concurrent run or manual edit?)")]
    DuplicateEntry { id: MigrationId },

    /// The ledger holds no entry for this migration (MG003).
    #[error("[MG003] Ledger has no entry for migration '{id}' (concurrent run or manual edit?)")]
    NotFound { id: MigrationId },

    /// The migration body itself failed; its transaction was rolled back (MG004).
    #[error("[MG004] Migration '{id}' failed while running {direction}: {source}")]
    Execution {
        id: MigrationId,
        direction: Direction,
        #[source]
        source: DbError,
    },

    /// Rollback reached a migration that declares no `down` (MG005).
    #[error("[MG005] Migration '{id}' is irreversible; rollback cannot go past it")]
    MissingDown { id: MigrationId },

    /// The ledger disagrees with the catalogue in a way that needs an operator (MG006).
    #[error("[MG006] Ledger integrity violated: {message}")]
    LedgerIntegrity { message: String },

    /// The ledger's own storage failed (MG007).
    #[error("[MG007] Ledger storage failed: {0}")]
    Ledger(#[from] DbError),

    /// The configured ledger table name is not a plain identifier (MG008).
    #[error("[MG008] Invalid ledger table name '{name}': use letters, digits and underscores, optionally as schema.table")]
    InvalidLedgerTable { name: String },
}

impl MigrateError {
    /// The migration this error is about, when there is one.
    pub fn migration_id(&self) -> Option<&MigrationId> {
        match self {
            MigrateError::DuplicateEntry { id }
            | MigrateError::NotFound { id }
            | MigrateError::Execution { id, .. }
            | MigrateError::MissingDown { id } => Some(id),
            _ => None,
        }
    }
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;
