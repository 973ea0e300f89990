//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use st_core::{Config, Project};
use st_db::DuckDbBackend;
use st_migrate::{BatchReport, DirectorySource, Direction, Ledger, Migrator};
use std::fmt;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: ExitCode is a control-flow mechanism, not a
        // user-facing error.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load a project from the directory specified in global CLI arguments.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let config_file = global.config.as_deref().map(Path::new);
    Project::load(Path::new(&global.project_dir), config_file).context("Failed to load project")
}

/// Resolve the database path: `--database` first, then the selected target,
/// then the project default.
///
/// Relative file paths are taken relative to the project root so the result
/// does not depend on the working directory.
pub(crate) fn resolve_database_path(project: &Project, global: &GlobalArgs) -> Result<String> {
    let path = match &global.database {
        Some(path) => path.clone(),
        None => {
            let target = Config::resolve_target(global.target.as_deref());
            let db_config = project
                .config
                .get_database_config(target.as_deref())
                .context("Failed to get database configuration")?;
            log::debug!(
                "Using {} database for target {}",
                db_config.db_type,
                target.as_deref().unwrap_or("<default>")
            );
            db_config.path
        }
    };

    if path == ":memory:" || Path::new(&path).is_absolute() {
        return Ok(path);
    }
    Ok(project.root.join(&path).display().to_string())
}

/// Everything a migration command needs: the project, an open database,
/// and the project's migrations directory as a source.
pub(crate) struct Session {
    pub(crate) project: Project,
    pub(crate) db: DuckDbBackend,
    pub(crate) source: DirectorySource,
}

impl Session {
    pub(crate) fn open(global: &GlobalArgs) -> Result<Self> {
        let project = load_project(global)?;
        let path = resolve_database_path(&project, global)?;
        log::debug!("Opening database {path}");
        let db = DuckDbBackend::new(&path)
            .with_context(|| format!("Failed to connect to database {path}"))?;
        let source = DirectorySource::new(project.migrations_dir());
        Ok(Self {
            project,
            db,
            source,
        })
    }

    /// A migrator honouring the project's ledger and checksum settings.
    pub(crate) fn migrator(&self) -> Result<Migrator<'_>> {
        let ledger = Ledger::new(&self.project.config.ledger.table)
            .context("Invalid ledger configuration")?;
        Ok(Migrator::new(&self.db, &self.source)
            .with_ledger(ledger)
            .verify_checksums(self.project.config.verify_checksums))
    }
}

/// Print what a batch committed and, on failure, what stopped it.
///
/// Returns `ExitCode(1)` when the batch did not complete, even if some
/// migrations were committed first.
pub(crate) fn finish_batch(report: &BatchReport) -> Result<()> {
    let verb = match report.direction {
        Direction::Up => "Applied",
        Direction::Down => "Reverted",
    };
    for id in &report.completed {
        println!("  {verb} {id}");
    }

    let count = report.completed.len();
    match &report.error {
        None => {
            println!("\n{verb} {count} migration(s)");
            Ok(())
        }
        Some(err) => {
            eprintln!("\nError: {err}");
            eprintln!(
                "{count} migration(s) {} before the failure; nothing after it ran",
                verb.to_lowercase()
            );
            Err(ExitCode(1).into())
        }
    }
}

// ---------------------------------------------------------------------------
// Table-printing utilities
// ---------------------------------------------------------------------------

/// Calculate column widths for a table given headers and row data.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a left-aligned table with a dashed separator under the header.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  ").trim_end());

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  ").trim_end());
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
