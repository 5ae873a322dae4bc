use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::PostgresConfig;
use crate::common::{DatabaseError, RetryPolicy, retry_with_backoff};

/// Open a pool with the given settings
pub async fn connect(config: PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(config.into_connect_options()).await?;
    info!("Connected to PostgreSQL");
    Ok(db)
}

/// Open a pool, retrying with exponential backoff while the server is unreachable.
///
/// ```ignore
/// use database::{RetryPolicy, postgres::{PostgresConfig, connect_with_retry}};
/// use std::time::Duration;
///
/// let db = connect_with_retry(config, RetryPolicy::new(10, Duration::from_secs(1))).await?;
/// ```
pub async fn connect_with_retry(
    config: PostgresConfig,
    policy: RetryPolicy,
) -> Result<DatabaseConnection, DatabaseError> {
    retry_with_backoff(policy, || connect(config.clone()))
        .await
        .map_err(|(attempts, e)| DatabaseError::ConnectionFailed {
            attempts,
            last_error: e.to_string(),
        })
}

/// Apply every pending migration of `M`
pub async fn run_migrations<M: MigratorTrait>(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    M::up(db, None)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
    info!("Database migrations applied");
    Ok(())
}
