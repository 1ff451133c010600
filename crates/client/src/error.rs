//! Client error types

use thiserror::Error;

use crate::active_table::TableError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached; the operation may be retried later
    #[error("server unreachable: {0}")]
    Offline(String),

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("realtime connection failed: {0}")]
    Realtime(String),

    #[error(transparent)]
    Table(#[from] TableError),
}

impl ClientError {
    /// Transport failures flip the dashboard offline and queue the write
    pub fn is_offline(&self) -> bool {
        matches!(self, ClientError::Offline(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ClientError::Api {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            ClientError::Offline(e.to_string())
        }
    }
}
