//! Down command implementation

use anyhow::Result;

use crate::cli::{DownArgs, GlobalArgs};
use crate::commands::common::{finish_batch, Session};

/// Execute the down command: revert the newest `steps` migrations.
pub async fn execute(args: &DownArgs, global: &GlobalArgs) -> Result<()> {
    if args.steps == 0 {
        println!("Nothing to roll back (0 steps requested)");
        return Ok(());
    }

    let session = Session::open(global)?;
    let migrator = session.migrator()?;

    println!(
        "Rolling back {} migration(s) in project: {}",
        args.steps, session.project.config.name
    );
    let report = migrator.rollback(args.steps);

    if report.is_success() && report.completed.is_empty() {
        println!("\nNo applied migrations to roll back");
        return Ok(());
    }
    finish_batch(&report)
}
