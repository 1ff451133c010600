//! Promotion leaderboards
//!
//! Only rows whose club-local date falls inside the promotion window
//! count. Hours are netted with the same formula as player totals.

use std::collections::HashMap;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::calendar::local_date;
use crate::constants::HOURS_EPSILON;
use crate::hours::net_hours;
use crate::models::{Addon, Penalty, Player, Promotion, Session};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Competition rank: equal hours share a rank, the next rank skips
    pub rank: usize,
    pub player_id: i64,
    pub player_name: String,
    pub hours: f64,
    pub sessions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionLeaderboard {
    pub promotion: Promotion,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Default)]
struct Tally {
    session_hours: f64,
    sessions: usize,
    penalty_minutes: i64,
    bonus_minutes: i64,
}

pub fn build_leaderboard(
    promotion: &Promotion,
    players: &[Player],
    sessions: &[Session],
    penalties: &[Penalty],
    addons: &[Addon],
    offset: FixedOffset,
) -> PromotionLeaderboard {
    let mut tallies: HashMap<i64, Tally> = HashMap::new();

    for s in sessions
        .iter()
        .filter(|s| promotion.covers(local_date(s.seat_in_time, offset)))
    {
        let tally = tallies.entry(s.player_id).or_default();
        tally.session_hours += s.duration;
        tally.sessions += 1;
    }
    for p in penalties
        .iter()
        .filter(|p| promotion.covers(local_date(p.date_applied, offset)))
    {
        tallies.entry(p.player_id).or_default().penalty_minutes += p.penalty_minutes as i64;
    }
    for a in addons
        .iter()
        .filter(|a| promotion.covers(local_date(a.date_applied, offset)))
    {
        tallies.entry(a.player_id).or_default().bonus_minutes += a.bonus_minutes as i64;
    }

    let names: HashMap<i64, &str> = players.iter().map(|p| (p.id, p.name.as_str())).collect();

    // Rows for players that no longer exist are skipped
    let mut entries: Vec<LeaderboardEntry> = tallies
        .into_iter()
        .filter_map(|(player_id, t)| {
            let name = names.get(&player_id)?;
            Some(LeaderboardEntry {
                rank: 0,
                player_id,
                player_name: name.to_string(),
                hours: net_hours(t.session_hours, t.penalty_minutes, t.bonus_minutes),
                sessions: t.sessions,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.hours
            .total_cmp(&a.hours)
            .then_with(|| a.player_name.to_lowercase().cmp(&b.player_name.to_lowercase()))
            .then(a.player_id.cmp(&b.player_id))
    });
    assign_ranks(&mut entries);

    PromotionLeaderboard {
        promotion: promotion.clone(),
        entries,
    }
}

fn assign_ranks(entries: &mut [LeaderboardEntry]) {
    let mut previous: Option<(f64, usize)> = None;
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = match previous {
            Some((hours, rank)) if (hours - entry.hours).abs() <= HOURS_EPSILON => rank,
            _ => i + 1,
        };
        previous = Some((entry.hours, entry.rank));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{offset_from_minutes, utc};
    use crate::models::{AddonReason, PenaltyReason};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn ts(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, h, 0, 0).unwrap()
    }

    fn promotion() -> Promotion {
        Promotion {
            id: 7,
            name: "June Hours Race".to_string(),
            start_date: day(10),
            end_date: day(20),
            active: true,
            deleted: false,
            created_at: ts(1, 0),
        }
    }

    fn player(id: i64, name: &str) -> Player {
        Player {
            id,
            name: name.to_string(),
            email: None,
            phone: None,
            join_date: day(1),
            total_hours: 0.0,
            total_sessions: 0,
            last_played: None,
            last_session_duration: None,
        }
    }

    fn session(id: i64, player_id: i64, d: u32, hours: f64) -> Session {
        Session {
            id,
            player_id,
            seat_in_time: ts(d, 18),
            seat_out_time: ts(d, 18) + chrono::Duration::minutes((hours * 60.0) as i64),
            duration: hours,
            day_of_week: String::new(),
            week_number: 0,
            month: 6,
            year: 2024,
        }
    }

    fn penalty(player_id: i64, d: u32, minutes: i32) -> Penalty {
        Penalty {
            id: 1,
            player_id,
            penalty_minutes: minutes,
            reason: "Slow play".to_string(),
            reason_type: PenaltyReason::Conduct,
            applied_by: None,
            date_applied: ts(d, 20),
            notes: None,
        }
    }

    fn addon(player_id: i64, d: u32, minutes: i32) -> Addon {
        Addon {
            id: 1,
            player_id,
            bonus_minutes: minutes,
            reason: "Promo bonus".to_string(),
            reason_type: AddonReason::Promotion,
            applied_by: None,
            date_applied: ts(d, 20),
            notes: None,
        }
    }

    #[test]
    fn test_window_and_ordering() {
        let players = [player(1, "Ana"), player(2, "Bo"), player(3, "Cy")];
        let sessions = [
            session(1, 1, 9, 10.0), // before window
            session(2, 1, 10, 2.0),
            session(3, 2, 15, 3.0),
            session(4, 2, 21, 5.0), // after window
            session(5, 1, 20, 1.0),
        ];
        let board = build_leaderboard(&promotion(), &players, &sessions, &[], &[], utc());

        let ids: Vec<i64> = board.entries.iter().map(|e| e.player_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(board.entries[0].hours, 3.0);
        assert_eq!(board.entries[1].hours, 3.0);
        assert_eq!(board.entries[0].sessions, 2);
        assert_eq!(board.entries[1].sessions, 1);
        // Equal hours share rank 1 and are ordered by name
        assert_eq!(board.entries[0].player_name, "Ana");
        assert_eq!(board.entries[0].rank, 1);
        assert_eq!(board.entries[1].rank, 1);
    }

    #[test]
    fn test_adjustments_and_competition_ranking() {
        let players = [player(1, "Ana"), player(2, "Bo"), player(3, "Cy"), player(4, "Di")];
        let sessions = [
            session(1, 1, 11, 4.0),
            session(2, 2, 11, 2.0),
            session(3, 3, 11, 2.0),
            session(4, 4, 11, 0.5),
        ];
        let penalties = [penalty(4, 12, 60), penalty(1, 1, 600)];
        let addons = [addon(3, 12, 30), addon(2, 12, 30)];

        let board = build_leaderboard(&promotion(), &players, &sessions, &penalties, &addons, utc());
        let ranks: Vec<(i64, usize)> = board.entries.iter().map(|e| (e.player_id, e.rank)).collect();
        assert_eq!(ranks, vec![(1, 1), (2, 2), (3, 2), (4, 4)]);
        // Out-of-window penalty ignored, in-window one floors at zero
        assert_eq!(board.entries[0].hours, 4.0);
        assert_eq!(board.entries[3].hours, 0.0);
    }

    #[test]
    fn test_local_offset_moves_rows_into_window() {
        let players = [player(1, "Ana")];
        // 02:00 UTC on the 21st is the evening of the 20th at UTC-6
        let mut late = session(1, 1, 21, 1.0);
        late.seat_in_time = Utc.with_ymd_and_hms(2024, 6, 21, 2, 0, 0).unwrap();

        let utc_board = build_leaderboard(&promotion(), &players, &[late.clone()], &[], &[], utc());
        assert!(utc_board.entries.is_empty());

        let local_board = build_leaderboard(
            &promotion(),
            &players,
            &[late],
            &[],
            &[],
            offset_from_minutes(-360),
        );
        assert_eq!(local_board.entries.len(), 1);
    }

    #[test]
    fn test_unknown_players_skipped() {
        let sessions = [session(1, 99, 12, 3.0)];
        let board = build_leaderboard(&promotion(), &[player(1, "Ana")], &sessions, &[], &[], utc());
        assert!(board.entries.is_empty());
    }
}
