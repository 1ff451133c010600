//! Database error types

use clubhours_core::ValidationError;
use deadpool_postgres::PoolError;
use tokio_postgres::error::SqlState;

#[derive(Debug)]
pub enum DbError {
    Pool(PoolError),
    Postgres(tokio_postgres::Error),
    /// (table, id) of a row that does not exist
    NotFound(&'static str, i64),
    /// Rejected input, including duplicate player names
    Invalid(ValidationError),
}

impl DbError {
    /// True for a unique-constraint violation reported by PostgreSQL
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::Postgres(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION))
    }
}

impl From<PoolError> for DbError {
    fn from(e: PoolError) -> Self {
        DbError::Pool(e)
    }
}

impl From<tokio_postgres::Error> for DbError {
    fn from(e: tokio_postgres::Error) -> Self {
        DbError::Postgres(e)
    }
}

impl From<ValidationError> for DbError {
    fn from(e: ValidationError) -> Self {
        DbError::Invalid(e)
    }
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbError::Pool(e) => write!(f, "Pool error: {}", e),
            DbError::Postgres(e) => write!(f, "Postgres error: {}", e),
            DbError::NotFound(table, id) => write!(f, "No {} with id {}", table, id),
            DbError::Invalid(e) => write!(f, "{}", e),
        }
    }
}
