// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use treasure_hunt_backend::config::Config;
use treasure_hunt_backend::routes;
use treasure_hunt_backend::seed;
use treasure_hunt_backend::state::AppState;
use treasure_hunt_backend::store::evidence::FsEvidenceStore;
use treasure_hunt_backend::store::postgres::{PgCheckpointStore, PgTeamStore};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let (config, config_warnings) = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    let state = match &config.database_url {
        Some(database_url) => {
            let pool = connect_database(database_url).await;
            let evidence =
                FsEvidenceStore::new(config.upload_dir.clone(), config.max_upload_bytes);

            AppState::new(
                config.clone(),
                Arc::new(PgTeamStore::new(pool.clone())),
                Arc::new(PgCheckpointStore::new(pool)),
                Arc::new(evidence),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, progress is kept in memory only");
            AppState::in_memory(config.clone())
        }
    };

    if config.seed_on_startup {
        if let Err(e) = seed::seed(state.teams.as_ref(), state.checkpoints.as_ref()).await {
            tracing::error!("Failed to seed sample data: {}", e);
        }
    }

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listening address");

    // Start the server
    axum::serve(listener, app).await.expect("Server error");
}

/// Connects with retry and applies migrations.
async fn connect_database(database_url: &str) -> PgPool {
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    pool
}
