use sleep_diary::{
    create_pool, create_router, diary::PgEntryRepository, logging, run_migrations, AppState,
    Config,
};
use std::{error::Error, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env().map_err(|e| format!("DATABASE_URL is not set: {e}"))?;
    let _guard = logging::init(&config.log_dir);

    let pool = create_pool(
        &config.database_url,
        config.database_max_connections,
        config.database_connect_retries,
    )
    .await?;
    run_migrations(&pool).await?;
    info!("database migrations applied");

    let repository = Arc::new(PgEntryRepository::new(pool));
    let state = Arc::new(AppState::new(config.clone(), repository));
    let app = create_router(state);

    info!("starting server on {}", config.server_address);
    let listener = tokio::net::TcpListener::bind(&config.server_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
