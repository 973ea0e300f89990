//! Outcome of one apply or rollback batch.

use crate::descriptor::Direction;
use crate::error::{MigrateError, MigrateResult};
use st_core::MigrationId;

/// What a batch committed, and why it stopped if it stopped early.
///
/// A batch halts at the first failure, so `completed` is exactly the set of
/// migrations whose transactions committed, in the order they ran.
#[derive(Debug)]
pub struct BatchReport {
    pub direction: Direction,
    /// Identifiers applied (or reverted) and committed, in execution order
    pub completed: Vec<MigrationId>,
    /// The error that stopped the batch, if any
    pub error: Option<MigrateError>,
}

impl BatchReport {
    pub(crate) fn new(direction: Direction) -> Self {
        Self {
            direction,
            completed: Vec::new(),
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Identifier of the migration the batch failed on, when the failure
    /// belongs to one.
    pub fn failed_id(&self) -> Option<&MigrationId> {
        self.error.as_ref().and_then(MigrateError::migration_id)
    }

    /// Collapse into a `Result`, dropping the partial progress on failure.
    pub fn into_result(self) -> MigrateResult<Vec<MigrationId>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.completed),
        }
    }

    pub(crate) fn log_summary(&self) {
        let verb = match self.direction {
            Direction::Up => "applied",
            Direction::Down => "reverted",
        };
        match &self.error {
            None => log::info!("{} {} migration(s)", verb, self.completed.len()),
            Some(e) => log::error!(
                "{} {} migration(s) before stopping: {e}",
                verb,
                self.completed.len()
            ),
        }
    }
}
