//! Session route handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use clubhours_core::{NewSession, Session, ValidationError};
use crate::AppState;
use super::PlayerFilter;
use super::error::{db_error, validation_error, ApiError, ApiResult};

/// GET /api/sessions?player_id=
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PlayerFilter>,
) -> ApiResult<Vec<Session>> {
    crate::db::list_sessions(&state.db_pool, filter.player_id)
        .await
        .map(Json)
        .map_err(|e| db_error("fetch sessions", e))
}

/// Record a session at seat-out
/// POST /api/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewSession>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    if body.seat_out_time < body.seat_in_time {
        return Err(validation_error(ValidationError::SeatOutBeforeSeatIn));
    }

    let session = crate::db::insert_session(&state.db_pool, &body, state.club_offset)
        .await
        .map_err(|e| db_error("record session", e))?;

    state.notify_change();
    Ok((StatusCode::CREATED, Json(session)))
}

/// DELETE /api/sessions/{id}
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    crate::db::delete_session(&state.db_pool, id)
        .await
        .map_err(|e| db_error("delete session", e))?;

    state.notify_change();
    Ok(StatusCode::NO_CONTENT)
}
