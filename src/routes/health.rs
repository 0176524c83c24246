use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

/// GET /health — 503 when the players table cannot be read.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM players")
        .fetch_one(&state.db)
        .await
    {
        Ok(players) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "db": "connected", "players": players })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "error", "db": e.to_string() })),
        ),
    }
}
