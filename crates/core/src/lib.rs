//! Shared types and logic for the club hours dashboard
//!
//! Used by both the server and the client crates. The hours formula in
//! [`hours`] is the only place player totals are computed.

pub mod calendar;
pub mod constants;
pub mod hours;
pub mod leaderboard;
pub mod messages;
pub mod models;
pub mod validation;

pub use calendar::CalendarFields;
pub use hours::{compute_player_stats, net_hours, session_duration_hours, HoursError, PlayerStats};
pub use leaderboard::{build_leaderboard, LeaderboardEntry, PromotionLeaderboard};
pub use messages::*;
pub use models::*;
pub use validation::ValidationError;
