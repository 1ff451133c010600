//! REST API routes

pub mod error;
pub mod players;
pub mod sessions;
pub mod promotions;
pub mod adjustments;
pub mod stats;

// Re-export all route handlers
pub use players::*;
pub use sessions::*;
pub use promotions::*;
pub use adjustments::*;
pub use stats::*;

/// `?player_id=` filter accepted by the list endpoints
#[derive(Debug, Default, serde::Deserialize)]
pub struct PlayerFilter {
    pub player_id: Option<i64>,
}
