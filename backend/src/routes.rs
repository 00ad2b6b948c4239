// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    handlers::{seed, submission, teams},
    state::AppState,
};

/// Room for the text fields and multipart framing around the photo.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if config.cors_origins.iter().any(|origin| origin == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(origins)
}

/// Assembles the main application router.
///
/// * Team routes (login, progress, submission log).
/// * Answer submission with a body limit sized for one photo.
/// * Seeding and static serving of stored photos.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let team_routes = Router::new()
        .route("/login", post(teams::login))
        .route("/{team_code}/progress", get(teams::progress))
        .route("/{team_code}/submissions", get(teams::submissions));

    let upload_routes = Router::new()
        .route("/submit-answer", post(submission::submit_answer))
        .layer(DefaultBodyLimit::max(
            state.config.max_upload_bytes + FORM_OVERHEAD_BYTES,
        ));

    Router::new()
        .nest("/api/teams", team_routes)
        .nest("/api/upload", upload_routes)
        .route("/api/seed", get(seed::seed_data))
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
