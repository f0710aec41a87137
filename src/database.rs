use sqlx::{migrate::MigrateError, postgres::PgPoolOptions, PgPool};
use std::time::Duration;

const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Connects to PostgreSQL, retrying the initial connection while the database
/// is still starting up.
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
    connect_attempts: u32,
) -> Result<PgPool, sqlx::Error> {
    let max_attempts = connect_attempts.max(1);
    let mut attempt = 1;

    loop {
        match PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                tracing::info!(attempt, "Connected to database");
                return Ok(pool);
            }
            Err(e) if attempt < max_attempts => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    error = %e,
                    "Failed to connect to database, retrying"
                );
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Applies the embedded `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!().run(pool).await
}
