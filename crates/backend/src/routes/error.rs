//! JSON error responses shared by all handlers

use axum::{http::StatusCode, Json};
use clubhours_core::ValidationError;
use crate::db::DbError;

pub type ApiError = (StatusCode, Json<serde_json::Value>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(serde_json::json!({"error": message.into()})))
}

pub fn validation_error(e: ValidationError) -> ApiError {
    match e {
        ValidationError::DuplicateName(_) => error_response(StatusCode::CONFLICT, e.to_string()),
        _ => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

/// Map a database failure; `context` is what the caller was doing
pub fn db_error(context: &str, e: DbError) -> ApiError {
    match e {
        DbError::NotFound(..) => error_response(StatusCode::NOT_FOUND, e.to_string()),
        DbError::Invalid(v) => validation_error(v),
        other => {
            tracing::error!("Failed to {}: {}", context, other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to {}", context))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let (status, body) = db_error("load player", DbError::NotFound("player", 9));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0["error"], "No player with id 9");

        let (status, _) = db_error(
            "create player",
            DbError::Invalid(ValidationError::DuplicateName("Ana".to_string())),
        );
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = validation_error(ValidationError::EmptyReason);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
