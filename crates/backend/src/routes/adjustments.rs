//! Penalty and addon route handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use clubhours_core::validation::{clean_addon, clean_penalty};
use clubhours_core::{Addon, NewAddon, NewPenalty, Penalty};
use crate::AppState;
use crate::db::AdjustmentKind;
use super::PlayerFilter;
use super::error::{db_error, validation_error, ApiError, ApiResult};

/// GET /api/penalties?player_id=
pub async fn list_penalties(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PlayerFilter>,
) -> ApiResult<Vec<Penalty>> {
    crate::db::list_penalties(&state.db_pool, filter.player_id)
        .await
        .map(Json)
        .map_err(|e| db_error("fetch penalties", e))
}

/// POST /api/penalties
pub async fn create_penalty(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewPenalty>,
) -> Result<(StatusCode, Json<Penalty>), ApiError> {
    let penalty = clean_penalty(body).map_err(validation_error)?;

    let created = crate::db::insert_penalty(&state.db_pool, &penalty)
        .await
        .map_err(|e| db_error("apply penalty", e))?;

    state.notify_change();
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/penalties/{id}
pub async fn delete_penalty(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    crate::db::delete_adjustment(&state.db_pool, AdjustmentKind::Penalty, id)
        .await
        .map_err(|e| db_error("delete penalty", e))?;

    state.notify_change();
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/addons?player_id=
pub async fn list_addons(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PlayerFilter>,
) -> ApiResult<Vec<Addon>> {
    crate::db::list_addons(&state.db_pool, filter.player_id)
        .await
        .map(Json)
        .map_err(|e| db_error("fetch addons", e))
}

/// POST /api/addons
pub async fn create_addon(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewAddon>,
) -> Result<(StatusCode, Json<Addon>), ApiError> {
    let addon = clean_addon(body).map_err(validation_error)?;

    let created = crate::db::insert_addon(&state.db_pool, &addon)
        .await
        .map_err(|e| db_error("apply addon", e))?;

    state.notify_change();
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/addons/{id}
pub async fn delete_addon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    crate::db::delete_adjustment(&state.db_pool, AdjustmentKind::Addon, id)
        .await
        .map_err(|e| db_error("delete addon", e))?;

    state.notify_change();
    Ok(StatusCode::NO_CONTENT)
}
