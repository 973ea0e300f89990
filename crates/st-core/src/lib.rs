//! st-core - Core library for Strata
//!
//! This crate provides the types shared by every Strata component: the
//! strongly-typed [`MigrationId`], project configuration parsing from
//! `strata.yml`, and the checksum used to detect edited migrations.

pub mod checksum;
pub mod config;
pub mod error;
pub mod migration_id;

pub use checksum::compute_checksum;
pub use config::{Config, DatabaseConfig, DbType, LedgerConfig, Project, TargetConfig};
pub use error::{CoreError, CoreResult};
pub use migration_id::MigrationId;
