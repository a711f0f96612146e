//! Embedded schema migrations.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{DbError, DbResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// ## Summary
/// Applies any migrations the database has not seen yet.
///
/// The diesel migration harness is synchronous, so this opens its own
/// short-lived `PgConnection` instead of borrowing from the async pool.
/// Runs once at startup, before the pool is built.
///
/// ## Errors
/// Returns `MigrationError` when the connection cannot be established or a
/// migration fails to apply.
#[tracing::instrument(skip(database_url))]
pub fn run_pending_migrations(database_url: &str) -> DbResult<()> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|e| DbError::MigrationError(e.to_string()))?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DbError::MigrationError(e.to_string()))?;

    if applied.is_empty() {
        tracing::debug!("Schema is up to date");
    }
    for version in &applied {
        tracing::info!(migration = %version, "Migration applied");
    }

    Ok(())
}
