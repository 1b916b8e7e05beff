/// Database migration runner
///
/// Thin wrapper around sqlx's migration system. Migration files live in
/// `migrations/` at the workspace root; each file is a plain SQL "up"
/// migration named `{version}_{description}.sql`.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// Safe to call on every startup: already-applied migrations are skipped.
///
/// # Errors
///
/// Returns an error if a migration file is malformed or fails to execute.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    let migrations = sqlx::migrate!("../migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("Database migrations up to date");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
