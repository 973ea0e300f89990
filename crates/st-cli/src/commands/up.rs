//! Up command implementation

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common::{finish_batch, Session};

/// Execute the up command: apply every pending migration.
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let migrator = session.migrator()?;

    println!(
        "Migrating project: {} ({})",
        session.project.config.name,
        migrator.ledger().table_name()
    );
    let report = migrator.run_pending();

    if report.is_success() && report.completed.is_empty() {
        println!("\nNothing to migrate; database is up to date");
        return Ok(());
    }
    finish_batch(&report)
}
