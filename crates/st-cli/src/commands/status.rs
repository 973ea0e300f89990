//! Status command implementation

use anyhow::{Context, Result};
use st_migrate::{LedgerEntry, StatusReport};
use std::collections::HashSet;

use crate::cli::{GlobalArgs, OutputFormat, StatusArgs};
use crate::commands::common::{print_table, ExitCode, Session};

/// Execute the status command.
///
/// Exits with code 1 when the ledger has orphaned or modified entries, so
/// scripts can gate deployments on a consistent history.
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let migrator = session.migrator()?;
    let report = migrator.status().context("Failed to read migration status")?;

    match args.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize status")?;
            println!("{json}");
        }
        OutputFormat::Table => {
            println!(
                "Project: {} ({})",
                session.project.config.name,
                migrator.ledger().table_name()
            );
            print_section(
                "Applied",
                &["MIGRATION", "APPLIED AT", "NOTE"],
                &applied_rows(&report),
            );
            print_section("Pending", &["MIGRATION"], &pending_rows(&report));
            print_section(
                "Orphaned",
                &["MIGRATION", "APPLIED AT"],
                &orphaned_rows(&report),
            );
            println!("\n{}", summary_line(&report));
            if report.is_up_to_date() && report.is_consistent() {
                println!("Database is up to date");
            }
        }
    }

    if !report.is_consistent() {
        if !report.orphaned.is_empty() {
            eprintln!(
                "Ledger has {} applied migration(s) missing from {}",
                report.orphaned.len(),
                session.source.dir().display()
            );
        }
        if !report.modified.is_empty() {
            eprintln!(
                "{} applied migration(s) were edited after being applied",
                report.modified.len()
            );
        }
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn print_section(title: &str, headers: &[&str], rows: &[Vec<String>]) {
    println!("\n{title} ({})", rows.len());
    if !rows.is_empty() {
        print_table(headers, rows);
    }
}

fn format_applied_at(entry: &LedgerEntry) -> String {
    entry.applied_at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Applied migrations still present in the source, oldest first.
///
/// Edited migrations stay in this list and are flagged in the note column.
pub(crate) fn applied_rows(report: &StatusReport) -> Vec<Vec<String>> {
    let orphaned: HashSet<&str> = report.orphaned.iter().map(|id| id.as_str()).collect();
    let modified: HashSet<&str> = report.modified.iter().map(|id| id.as_str()).collect();

    report
        .applied
        .iter()
        .filter(|entry| !orphaned.contains(entry.id.as_str()))
        .map(|entry| {
            let note = if modified.contains(entry.id.as_str()) {
                "modified since applied"
            } else {
                ""
            };
            vec![entry.id.to_string(), format_applied_at(entry), note.to_string()]
        })
        .collect()
}

pub(crate) fn pending_rows(report: &StatusReport) -> Vec<Vec<String>> {
    report.pending.iter().map(|id| vec![id.to_string()]).collect()
}

/// Ledger entries with no migration in the source.
pub(crate) fn orphaned_rows(report: &StatusReport) -> Vec<Vec<String>> {
    let orphaned: HashSet<&str> = report.orphaned.iter().map(|id| id.as_str()).collect();
    report
        .applied
        .iter()
        .filter(|entry| orphaned.contains(entry.id.as_str()))
        .map(|entry| vec![entry.id.to_string(), format_applied_at(entry)])
        .collect()
}

pub(crate) fn summary_line(report: &StatusReport) -> String {
    format!(
        "{} applied, {} pending, {} orphaned, {} modified",
        report.applied.len(),
        report.pending.len(),
        report.orphaned.len(),
        report.modified.len()
    )
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
