// Library exports for the API binary, the seed tool and tests
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use config::Config;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(cors_origin(&state.config));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        .route("/api/stats", get(routes::stats::get_stats))
        .route(
            "/api/players",
            get(routes::players::list_players).post(routes::players::create_player),
        )
        .route("/api/players/search", get(routes::players::search_players))
        .route(
            "/api/players/{id}",
            get(routes::players::get_player)
                .put(routes::players::update_player)
                .delete(routes::players::delete_player),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn cors_origin(config: &Config) -> AllowOrigin {
    match config.cors_allowed_origin.as_deref() {
        None => AllowOrigin::any(),
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!("Ignoring invalid CORS_ALLOWED_ORIGIN {origin:?}; allowing any origin");
                AllowOrigin::any()
            }
        },
    }
}
