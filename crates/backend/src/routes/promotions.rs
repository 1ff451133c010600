//! Promotion and leaderboard route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use clubhours_core::validation::clean_promotion;
use clubhours_core::{NewPromotion, Promotion, PromotionLeaderboard};
use crate::AppState;
use super::error::{db_error, validation_error, ApiError, ApiResult};

/// GET /api/promotions
pub async fn list_promotions(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Promotion>> {
    crate::db::list_promotions(&state.db_pool)
        .await
        .map(Json)
        .map_err(|e| db_error("fetch promotions", e))
}

/// GET /api/promotions/{id}
pub async fn get_promotion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Promotion> {
    crate::db::get_promotion(&state.db_pool, id)
        .await
        .map(Json)
        .map_err(|e| db_error("fetch promotion", e))
}

/// POST /api/promotions
pub async fn create_promotion(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewPromotion>,
) -> Result<(StatusCode, Json<Promotion>), ApiError> {
    let promotion = clean_promotion(body).map_err(validation_error)?;

    let created = crate::db::insert_promotion(&state.db_pool, &promotion)
        .await
        .map_err(|e| db_error("create promotion", e))?;

    state.notify_change();
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/promotions/{id}
pub async fn update_promotion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<NewPromotion>,
) -> ApiResult<Promotion> {
    let promotion = clean_promotion(body).map_err(validation_error)?;

    let updated = crate::db::update_promotion(&state.db_pool, id, &promotion)
        .await
        .map_err(|e| db_error("update promotion", e))?;

    state.notify_change();
    Ok(Json(updated))
}

#[derive(serde::Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// POST /api/promotions/{id}/active
pub async fn set_promotion_active(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<SetActiveRequest>,
) -> ApiResult<Promotion> {
    let updated = crate::db::set_promotion_active(&state.db_pool, id, body.active)
        .await
        .map_err(|e| db_error("update promotion", e))?;

    state.notify_change();
    Ok(Json(updated))
}

/// Soft delete
/// DELETE /api/promotions/{id}
pub async fn delete_promotion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    crate::db::soft_delete_promotion(&state.db_pool, id)
        .await
        .map_err(|e| db_error("delete promotion", e))?;

    state.notify_change();
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/promotions/{id}/leaderboard
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<PromotionLeaderboard> {
    crate::db::get_leaderboard(&state.db_pool, id, state.club_offset)
        .await
        .map(Json)
        .map_err(|e| db_error("build leaderboard", e))
}
