//! Database layer for pvr-extract
//!
//! Persists the extraction settings in SQLite so they survive restarts of the
//! host.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`settings`] - The flat configuration record (`plugin_config` table)

use sqlx::sqlite::SqlitePool;

mod migrations;
mod settings;

/// Database handle for pvr-extract
pub struct Database {
    pool: SqlitePool,
}
