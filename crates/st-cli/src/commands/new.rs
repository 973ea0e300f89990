//! New command implementation: scaffold a migration directory.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common::load_project;

/// Execute the new command
pub async fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    validate_slug(&args.slug)?;
    let project = load_project(global)?;

    let dir = scaffold(
        &project.migrations_dir(),
        &args.slug,
        args.irreversible,
        Utc::now(),
    )?;

    println!("Created migration: {}", dir.display());
    if args.irreversible {
        println!("  Marked irreversible; `migrate down` will stop at it");
    }
    Ok(())
}

/// Slugs become part of the identifier, so keep them to `[a-z0-9_]+`.
pub(crate) fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() {
        bail!("Migration name must not be empty");
    }
    if let Some(c) = slug
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_'))
    {
        bail!(
            "Invalid migration name '{slug}': unexpected character '{c}' (use lowercase letters, digits and underscores)"
        );
    }
    Ok(())
}

/// Create `<migrations_dir>/<yyyymmddHHMMSS>_<slug>/` with template files.
pub(crate) fn scaffold(
    migrations_dir: &Path,
    slug: &str,
    irreversible: bool,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let id = format!("{}_{slug}", now.format("%Y%m%d%H%M%S"));
    let dir = migrations_dir.join(&id);
    if dir.exists() {
        bail!("Migration {} already exists", dir.display());
    }
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    write_file(&dir.join("up.sql"), &format!("-- {id}: forward change\n"))?;
    if irreversible {
        write_file(
            &dir.join("migration.yml"),
            &format!("description: {slug}\nirreversible: true\n"),
        )?;
    } else {
        write_file(&dir.join("down.sql"), &format!("-- {id}: undo the forward change\n"))?;
    }
    Ok(dir)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
#[path = "new_test.rs"]
mod tests;
