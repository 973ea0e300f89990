//! Strongly-typed migration identifier.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Identifier of one migration, e.g. `20240105120000_create_locations`.
///
/// Identifiers order migrations: lexicographic order of the identifier is the
/// order in which migrations are applied. They are restricted to ASCII
/// alphanumerics, `_`, `-` and `.` so they are safe as directory names and
/// sort the same on every platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MigrationId(String);

impl MigrationId {
    /// Validate and wrap an identifier.
    pub fn parse(id: impl Into<String>) -> CoreResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::InvalidMigrationId {
                id,
                reason: "identifier must not be empty".to_string(),
            });
        }
        if let Some(bad) = id.chars().find(|c| !is_id_char(*c)) {
            return Err(CoreError::InvalidMigrationId {
                reason: format!(
                    "character '{bad}' is not allowed (use ASCII letters, digits, '_', '-' or '.')"
                ),
                id,
            });
        }
        Ok(Self(id))
    }

    /// Create a new `MigrationId` from a literal known to be valid.
    ///
    /// Panics on invalid input; use [`parse`](Self::parse) for anything read
    /// from disk or from the database.
    pub fn new(id: impl Into<String>) -> Self {
        match Self::parse(id) {
            Ok(id) => id,
            Err(e) => panic!("{e}"),
        }
    }

    /// Return the underlying identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MigrationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for MigrationId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MigrationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MigrationId {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for MigrationId {
    type Error = CoreError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<MigrationId> for String {
    fn from(id: MigrationId) -> Self {
        id.0
    }
}

impl PartialEq<str> for MigrationId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MigrationId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for MigrationId {
    fn eq(&self, other: &String) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[path = "migration_id_test.rs"]
mod tests;
