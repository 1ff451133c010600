//! Hours calculation
//!
//! `total_hours = max(0, Σ session.duration − Σ penalty_minutes/60 + Σ bonus_minutes/60)`
//!
//! Every code path that writes player totals goes through
//! [`compute_player_stats`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::HOURS_EPSILON;
use crate::models::{Addon, Penalty, Player, Session};

#[derive(Debug, Error, PartialEq)]
pub enum HoursError {
    #[error("seat-out time {seat_out} is before seat-in time {seat_in}")]
    SeatOutBeforeSeatIn {
        seat_in: DateTime<Utc>,
        seat_out: DateTime<Utc>,
    },
}

/// Cached statistics stored on the player row
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub total_hours: f64,
    pub total_sessions: i32,
    pub last_played: Option<DateTime<Utc>>,
    pub last_session_duration: Option<f64>,
}

impl PlayerStats {
    /// True when the stored columns on `player` no longer match these stats
    pub fn differs_from(&self, player: &Player) -> bool {
        let hours_drift = (self.total_hours - player.total_hours).abs() > HOURS_EPSILON;
        let duration_drift = match (self.last_session_duration, player.last_session_duration) {
            (Some(a), Some(b)) => (a - b).abs() > HOURS_EPSILON,
            (None, None) => false,
            _ => true,
        };
        hours_drift
            || duration_drift
            || self.total_sessions != player.total_sessions
            || self.last_played != player.last_played
    }
}

/// Length of a session in hours
pub fn session_duration_hours(
    seat_in: DateTime<Utc>,
    seat_out: DateTime<Utc>,
) -> Result<f64, HoursError> {
    if seat_out < seat_in {
        return Err(HoursError::SeatOutBeforeSeatIn { seat_in, seat_out });
    }
    let millis = (seat_out - seat_in).num_milliseconds();
    Ok(millis as f64 / 3_600_000.0)
}

/// Net hours after adjustments, floored at zero
pub fn net_hours(session_hours: f64, penalty_minutes: i64, bonus_minutes: i64) -> f64 {
    let net = session_hours - penalty_minutes as f64 / 60.0 + bonus_minutes as f64 / 60.0;
    net.max(0.0)
}

/// Recompute all cached stats for one player from their rows
pub fn compute_player_stats(
    sessions: &[Session],
    penalties: &[Penalty],
    addons: &[Addon],
) -> PlayerStats {
    let session_hours: f64 = sessions.iter().map(|s| s.duration).sum();
    let penalty_minutes: i64 = penalties.iter().map(|p| p.penalty_minutes as i64).sum();
    let bonus_minutes: i64 = addons.iter().map(|a| a.bonus_minutes as i64).sum();

    // Ties on seat-out resolve to the higher id, i.e. the later insert
    let latest = sessions
        .iter()
        .max_by(|a, b| a.seat_out_time.cmp(&b.seat_out_time).then(a.id.cmp(&b.id)));

    PlayerStats {
        total_hours: net_hours(session_hours, penalty_minutes, bonus_minutes),
        total_sessions: sessions.len() as i32,
        last_played: latest.map(|s| s.seat_out_time),
        last_session_duration: latest.map(|s| s.duration),
    }
}
