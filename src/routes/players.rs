use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::{
    models::player::{CreatePlayerRequest, Player, StatusFilter, UpdatePlayerRequest},
    services::{
        metrics::record_mutation,
        players::{PlayerError, PlayerService},
    },
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Every failure is reported in the body with HTTP 200.
fn failure(message: impl std::fmt::Display) -> Json<Value> {
    Json(json!({ "success": false, "message": message.to_string() }))
}

fn log_failure(op: &str, e: &PlayerError) {
    match e {
        PlayerError::Database(_) => error!("{op}: {e}"),
        _ => warn!("{op}: {e}"),
    }
}

/// GET /api/players?status=Active|Inactive|Suspended|All (default Active)
pub async fn list_players(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Json<Vec<Player>> {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!("list_players: rejected query: {}", rejection.body_text());
            return Json(Vec::new());
        }
    };
    let filter = match query.status.as_deref().map(str::parse::<StatusFilter>) {
        None => StatusFilter::default(),
        Some(Ok(filter)) => filter,
        Some(Err(e)) => {
            warn!("list_players: {e}");
            return Json(Vec::new());
        }
    };

    match PlayerService::list(&state.db, filter).await {
        Ok(players) => Json(players),
        Err(e) => {
            log_failure("list_players", &e);
            Json(Vec::new())
        }
    }
}

/// GET /api/players/search?q=term
pub async fn search_players(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Json<Vec<Player>> {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!("search_players: rejected query: {}", rejection.body_text());
            return Json(Vec::new());
        }
    };
    match PlayerService::search(&state.db, &query.q).await {
        Ok(players) => Json(players),
        Err(e) => {
            log_failure("search_players", &e);
            Json(Vec::new())
        }
    }
}

pub async fn get_player(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => {
            warn!("get_player: rejected path: {}", rejection.body_text());
            return failure(rejection.body_text()).into_response();
        }
    };

    match PlayerService::get(&state.db, id).await {
        Ok(Some(player)) => Json(player).into_response(),
        Ok(None) => failure(PlayerError::NotFound(id)).into_response(),
        Err(e) => {
            log_failure("get_player", &e);
            failure(e).into_response()
        }
    }
}

pub async fn create_player(
    State(state): State<AppState>,
    body: Result<Json<CreatePlayerRequest>, JsonRejection>,
) -> Json<Value> {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!("create_player: rejected body: {}", rejection.body_text());
            record_mutation("create", false);
            return failure(rejection.body_text());
        }
    };

    match PlayerService::create(&state.db, &req).await {
        Ok(player_id) => {
            record_mutation("create", true);
            Json(json!({ "success": true, "player_id": player_id }))
        }
        Err(e) => {
            log_failure("create_player", &e);
            record_mutation("create", false);
            failure(e)
        }
    }
}

pub async fn update_player(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdatePlayerRequest>, JsonRejection>,
) -> Json<Value> {
    let (Path(id), Json(req)) = match (id, body) {
        (Ok(id), Ok(body)) => (id, body),
        (Err(rejection), _) => {
            warn!("update_player: rejected path: {}", rejection.body_text());
            record_mutation("update", false);
            return failure(rejection.body_text());
        }
        (_, Err(rejection)) => {
            warn!("update_player: rejected body: {}", rejection.body_text());
            record_mutation("update", false);
            return failure(rejection.body_text());
        }
    };

    let result = PlayerService::update(&state.db, id, &req).await;
    record_mutation("update", result.is_ok());
    match result {
        Ok(()) => Json(json!({ "success": true })),
        Err(e) => {
            log_failure("update_player", &e);
            failure(e)
        }
    }
}

pub async fn delete_player(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Json<Value> {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => {
            warn!("delete_player: rejected path: {}", rejection.body_text());
            record_mutation("delete", false);
            return failure(rejection.body_text());
        }
    };

    let result = PlayerService::delete(&state.db, id).await;
    record_mutation("delete", result.is_ok());
    match result {
        Ok(()) => Json(json!({ "success": true })),
        Err(e) => {
            log_failure("delete_player", &e);
            failure(e)
        }
    }
}
