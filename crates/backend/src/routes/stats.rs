//! Roster recalculation and the TV display aggregate

use axum::{extract::State, Json};
use std::sync::Arc;
use clubhours_core::{DisplaySnapshot, RecalculationReport};
use crate::AppState;
use super::error::{db_error, ApiResult};

/// Rebuild every player's totals from their rows
/// POST /api/stats/recalculate
pub async fn recalculate_all(State(state): State<Arc<AppState>>) -> ApiResult<RecalculationReport> {
    let report = crate::db::recalculate_all(&state.db_pool)
        .await
        .map_err(|e| db_error("recalculate stats", e))?;

    if report.players_updated > 0 {
        state.notify_change();
    }
    Ok(Json(report))
}

/// Read-only aggregate of all tables for the TV display
/// GET /api/display
pub async fn get_display(State(state): State<Arc<AppState>>) -> ApiResult<DisplaySnapshot> {
    crate::db::load_snapshot(&state.db_pool, state.club_offset)
        .await
        .map(Json)
        .map_err(|e| db_error("load display data", e))
}
