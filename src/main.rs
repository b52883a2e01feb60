//! Trailmeet hiking event service
//!
//! Main application entry point

use std::time::Duration;

use tracing::{error, info};

use trailmeet::{
    config::Settings,
    database::{self, connection::DatabaseConfig, DatabaseService},
    handlers::{self, AppState},
    jobs::{AutoCompletionSweep, ChangeDispatcher},
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard must live for the whole run
    let _guard = logging::init_logging(&settings.logging)?;

    info!("Starting Trailmeet service...");

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = DatabaseConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        acquire_timeout: Duration::from_secs(30),
        idle_timeout: Some(Duration::from_secs(600)),
        max_lifetime: Some(Duration::from_secs(1800)),
    };
    let pool = database::create_pool(&db_config).await?;

    info!("Running database migrations...");
    database::run_migrations(&pool).await?;

    let db = DatabaseService::new(pool.clone());
    let services = ServiceFactory::new(&db, &settings);

    // Background jobs run alongside the HTTP server
    let sweep = AutoCompletionSweep::new(db.events.clone());
    tokio::spawn(sweep.run(Duration::from_secs(settings.jobs.sweep_interval_secs)));

    let dispatcher = ChangeDispatcher::new(
        &db,
        services.notification_service.clone(),
        settings.jobs.dispatch_batch_size,
    );
    tokio::spawn(dispatcher.run(Duration::from_secs(settings.jobs.dispatch_interval_secs)));

    // HTTP server
    let app = handlers::router(AppState { services, pool });
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!(addr = %addr, "Listening for requests");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
