//! Embedded schema migrations.
//!
//! The SQL lives in `migrations/sqlite/` at the workspace root and is compiled
//! into the binary, so the server and the seed tool carry the same schema.
//! Files are applied in `NNN_description.sql` order and never edited once
//! released; schema changes go in a new file.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(migrations = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}

/// `(embedded, successfully applied)` migration counts.
///
/// A database that was never migrated reports zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}
