/// Database migration runner
///
/// Runs the SQL migrations stored in the `migrations/` directory at the
/// workspace root using sqlx's embedded migration system.
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskdeck_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///
///     Ok(())
/// }
/// ```

use sqlx::postgres::PgPool;
use tracing::info;

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Number of migrations that have been applied
    pub applied_migrations: usize,

    /// Latest applied migration version (timestamp)
    pub latest_version: Option<i64>,
}

/// Runs all pending database migrations
///
/// Creates the migrations bookkeeping table if needed and applies every
/// migration that has not run yet, in version order.
///
/// # Errors
///
/// Returns an error if any migration fails to apply. Migrations run inside
/// transactions, so a failed migration does not leave the schema half-applied.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    sqlx::migrate!("../migrations").run(pool).await?;

    info!("Database migrations complete");
    Ok(())
}

/// Gets the current migration status
///
/// Reads sqlx's `_sqlx_migrations` bookkeeping table. Returns zero applied
/// migrations if the table does not exist yet.
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    let row: Option<(i64, Option<i64>)> = sqlx::query_as(
        r#"
        SELECT COUNT(*), MAX(version)
        FROM _sqlx_migrations
        WHERE success = TRUE
        "#,
    )
    .fetch_optional(pool)
    .await
    .ok()
    .flatten();

    let (applied, latest) = row.unwrap_or((0, None));

    Ok(MigrationStatus {
        applied_migrations: applied as usize,
        latest_version: latest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_status_debug() {
        let status = MigrationStatus {
            applied_migrations: 5,
            latest_version: Some(20240301000005),
        };
        let debug = format!("{:?}", status);
        assert!(debug.contains("applied_migrations: 5"));
    }

    // Integration tests for the runner itself require a database and live
    // in taskdeck-api/tests/.
}
