//! Player roster route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use clubhours_core::validation::clean_player;
use clubhours_core::{NewPlayer, Player, PlayerStats};
use crate::AppState;
use super::error::{db_error, validation_error, ApiError, ApiResult};

/// GET /api/players
pub async fn list_players(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Player>> {
    crate::db::list_players(&state.db_pool)
        .await
        .map(Json)
        .map_err(|e| db_error("fetch players", e))
}

/// GET /api/players/{id}
pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Player> {
    crate::db::get_player(&state.db_pool, id)
        .await
        .map(Json)
        .map_err(|e| db_error("fetch player", e))
}

/// POST /api/players
pub async fn create_player(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewPlayer>,
) -> Result<(StatusCode, Json<Player>), ApiError> {
    let player = clean_player(body).map_err(validation_error)?;

    let created = crate::db::insert_player(&state.db_pool, &player)
        .await
        .map_err(|e| db_error("create player", e))?;

    state.notify_change();
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/players/{id}
pub async fn update_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<NewPlayer>,
) -> ApiResult<Player> {
    let player = clean_player(body).map_err(validation_error)?;

    let updated = crate::db::update_player(&state.db_pool, id, &player)
        .await
        .map_err(|e| db_error("update player", e))?;

    state.notify_change();
    Ok(Json(updated))
}

/// DELETE /api/players/{id}
pub async fn delete_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    crate::db::delete_player(&state.db_pool, id)
        .await
        .map_err(|e| db_error("delete player", e))?;

    state.notify_change();
    Ok(StatusCode::NO_CONTENT)
}

/// Freshly computed stats, independent of the stored columns
/// GET /api/players/{id}/stats
pub async fn get_player_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<PlayerStats> {
    crate::db::preview_player_stats(&state.db_pool, id)
        .await
        .map(Json)
        .map_err(|e| db_error("compute player stats", e))
}
