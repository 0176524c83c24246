use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::{services::stats::StatsService, AppState};

/// GET /api/stats — `{}` when the aggregates cannot be computed.
pub async fn get_stats(State(state): State<AppState>) -> Response {
    match StatsService::academy_stats(&state.db).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            error!("get_stats: {e}");
            Json(json!({})).into_response()
        }
    }
}
