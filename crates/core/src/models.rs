//! Data models persisted by the server and exchanged with clients

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::leaderboard::PromotionLeaderboard;

// ============================================================================
// Players
// ============================================================================

/// A club member with cached play statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub join_date: NaiveDate,
    /// Net hours after penalties and addons, never negative
    pub total_hours: f64,
    pub total_sessions: i32,
    pub last_played: Option<DateTime<Utc>>,
    /// Duration in hours of the most recent session
    pub last_session_duration: Option<f64>,
}

/// Form payload for creating or editing a player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Defaults to today when omitted
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
}

// ============================================================================
// Sessions
// ============================================================================

/// A completed seat-in/seat-out interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub player_id: i64,
    pub seat_in_time: DateTime<Utc>,
    pub seat_out_time: DateTime<Utc>,
    /// Hours between seat-in and seat-out
    pub duration: f64,
    pub day_of_week: String,
    pub week_number: i32,
    pub month: i32,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSession {
    pub player_id: i64,
    pub seat_in_time: DateTime<Utc>,
    pub seat_out_time: DateTime<Utc>,
}

// ============================================================================
// Promotions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: i64,
    pub name: String,
    /// First day of the promotion (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the promotion (inclusive)
    pub end_date: NaiveDate,
    pub active: bool,
    /// Soft-delete flag; deleted promotions are hidden from listings
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    /// Whether the promotion counts as live on the given day
    pub fn is_running(&self, today: NaiveDate) -> bool {
        self.active && !self.deleted && self.covers(today)
    }

    /// Whether the day falls inside the promotion window
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPromotion {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

// ============================================================================
// Penalties and addons
// ============================================================================

/// Why a penalty was applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyReason {
    Late,
    Conduct,
    NoShow,
    #[default]
    Other,
}

impl PenaltyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PenaltyReason::Late => "late",
            PenaltyReason::Conduct => "conduct",
            PenaltyReason::NoShow => "no_show",
            PenaltyReason::Other => "other",
        }
    }

    /// Parse a stored value; anything unrecognised is `Other`
    pub fn from_db(value: &str) -> Self {
        match value {
            "late" => PenaltyReason::Late,
            "conduct" => PenaltyReason::Conduct,
            "no_show" => PenaltyReason::NoShow,
            _ => PenaltyReason::Other,
        }
    }
}

/// Why bonus minutes were granted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonReason {
    Promotion,
    Compensation,
    Correction,
    #[default]
    Other,
}

impl AddonReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddonReason::Promotion => "promotion",
            AddonReason::Compensation => "compensation",
            AddonReason::Correction => "correction",
            AddonReason::Other => "other",
        }
    }

    /// Parse a stored value; anything unrecognised is `Other`
    pub fn from_db(value: &str) -> Self {
        match value {
            "promotion" => AddonReason::Promotion,
            "compensation" => AddonReason::Compensation,
            "correction" => AddonReason::Correction,
            _ => AddonReason::Other,
        }
    }
}

/// Minutes deducted from a player's hours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Penalty {
    pub id: i64,
    pub player_id: i64,
    pub penalty_minutes: i32,
    pub reason: String,
    pub reason_type: PenaltyReason,
    pub applied_by: Option<String>,
    pub date_applied: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPenalty {
    pub player_id: i64,
    pub penalty_minutes: i32,
    pub reason: String,
    #[serde(default)]
    pub reason_type: PenaltyReason,
    #[serde(default)]
    pub applied_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Bonus minutes credited to a player's hours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Addon {
    pub id: i64,
    pub player_id: i64,
    pub bonus_minutes: i32,
    pub reason: String,
    pub reason_type: AddonReason,
    pub applied_by: Option<String>,
    pub date_applied: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAddon {
    pub player_id: i64,
    pub bonus_minutes: i32,
    pub reason: String,
    #[serde(default)]
    pub reason_type: AddonReason,
    #[serde(default)]
    pub applied_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// ============================================================================
// Aggregates
// ============================================================================

/// Result of a roster-wide stat recalculation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculationReport {
    pub players_checked: usize,
    /// Players whose stored stats had drifted and were rewritten
    pub players_updated: usize,
}

/// Everything the TV display and realtime subscribers need, in one payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub players: Vec<Player>,
    pub sessions: Vec<Session>,
    pub promotions: Vec<Promotion>,
    /// Leaderboards of promotions running at `generated_at`
    pub leaderboards: Vec<PromotionLeaderboard>,
    pub penalties: Vec<Penalty>,
    pub addons: Vec<Addon>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn promo(active: bool, deleted: bool) -> Promotion {
        Promotion {
            id: 1,
            name: "October Grind".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 10, 31).unwrap(),
            active,
            deleted,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_promotion_running_window() {
        let p = promo(true, false);
        assert!(p.is_running(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()));
        assert!(p.is_running(NaiveDate::from_ymd_opt(2024, 10, 31).unwrap()));
        assert!(!p.is_running(NaiveDate::from_ymd_opt(2024, 11, 1).unwrap()));
        assert!(!promo(false, false).is_running(NaiveDate::from_ymd_opt(2024, 10, 15).unwrap()));
        assert!(!promo(true, true).is_running(NaiveDate::from_ymd_opt(2024, 10, 15).unwrap()));
    }

    #[test]
    fn test_reason_types_fall_back_to_other() {
        assert_eq!(PenaltyReason::from_db("no_show"), PenaltyReason::NoShow);
        assert_eq!(PenaltyReason::from_db("Spilled drink"), PenaltyReason::Other);
        assert_eq!(AddonReason::from_db("correction"), AddonReason::Correction);
        assert_eq!(AddonReason::from_db(""), AddonReason::Other);
        assert_eq!(PenaltyReason::default(), PenaltyReason::Other);
        assert_eq!(AddonReason::default(), AddonReason::Other);

        let json = serde_json::to_string(&PenaltyReason::NoShow).unwrap();
        assert_eq!(json, "\"no_show\"");
    }

    #[test]
    fn test_new_penalty_defaults() {
        let penalty: NewPenalty = serde_json::from_str(
            r#"{"player_id": 4, "penalty_minutes": 15, "reason": "Late to table"}"#,
        )
        .unwrap();
        assert_eq!(penalty.reason_type, PenaltyReason::Other);
        assert!(penalty.applied_by.is_none());
    }
}
