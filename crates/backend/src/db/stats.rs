//! Player stat recalculation
//!
//! Totals are always rebuilt from every row a player owns, inside the
//! same transaction as the write that changed them.

use clubhours_core::{
    compute_player_stats, Addon, Penalty, Player, PlayerStats, RecalculationReport, Session,
};
use deadpool_postgres::Pool;
use tokio_postgres::GenericClient;
use crate::db::DbError;
use crate::db::adjustments::{load_addons, load_penalties};
use crate::db::players::player_from_row;
use crate::db::sessions::load_sessions;

/// Lock a player row for the rest of the transaction
pub(crate) async fn lock_player<C: GenericClient + Sync>(client: &C, id: i64) -> Result<Player, DbError> {
    let row = client.query_opt(
        r#"
        SELECT id, name, email, phone, join_date, total_hours, total_sessions,
               last_played, last_session_duration
        FROM players
        WHERE id = $1
        FOR UPDATE
        "#,
        &[&id]
    ).await?;

    row.map(|r| player_from_row(&r))
        .ok_or(DbError::NotFound("player", id))
}

/// Compute stats from the player's rows without writing anything
pub(crate) async fn compute_stats<C: GenericClient + Sync>(
    client: &C,
    player_id: i64,
) -> Result<PlayerStats, DbError> {
    let sessions = load_sessions(client, Some(player_id)).await?;
    let penalties = load_penalties(client, Some(player_id)).await?;
    let addons = load_addons(client, Some(player_id)).await?;

    Ok(compute_player_stats(&sessions, &penalties, &addons))
}

/// New stats for `player` from its rows, and whether the stored columns
/// must be rewritten. Rows owned by other players are ignored.
pub(crate) fn plan_recalculation(
    player: &Player,
    sessions: &[Session],
    penalties: &[Penalty],
    addons: &[Addon],
) -> (PlayerStats, bool) {
    let sessions: Vec<Session> = sessions.iter().filter(|s| s.player_id == player.id).cloned().collect();
    let penalties: Vec<Penalty> = penalties.iter().filter(|p| p.player_id == player.id).cloned().collect();
    let addons: Vec<Addon> = addons.iter().filter(|a| a.player_id == player.id).cloned().collect();

    let stats = compute_player_stats(&sessions, &penalties, &addons);
    let drifted = stats.differs_from(player);
    (stats, drifted)
}

/// Recompute and store stats for a player locked with [`lock_player`].
/// Returns the new stats and whether the stored values had drifted.
pub(crate) async fn recalculate_locked<C: GenericClient + Sync>(
    client: &C,
    player: &Player,
) -> Result<(PlayerStats, bool), DbError> {
    let sessions = load_sessions(client, Some(player.id)).await?;
    let penalties = load_penalties(client, Some(player.id)).await?;
    let addons = load_addons(client, Some(player.id)).await?;
    let (stats, drifted) = plan_recalculation(player, &sessions, &penalties, &addons);

    if drifted {
        client.execute(
            r#"
            UPDATE players SET
                total_hours = $2,
                total_sessions = $3,
                last_played = $4,
                last_session_duration = $5
            WHERE id = $1
            "#,
            &[
                &player.id,
                &stats.total_hours,
                &stats.total_sessions,
                &stats.last_played,
                &stats.last_session_duration,
            ]
        ).await?;

        tracing::debug!(
            player_id = %player.id,
            total_hours = %stats.total_hours,
            total_sessions = %stats.total_sessions,
            "Player stats updated"
        );
    }

    Ok((stats, drifted))
}

/// Recalculate one player in its own transaction
pub async fn recalculate_player(pool: &Pool, player_id: i64) -> Result<PlayerStats, DbError> {
    let mut client = pool.get().await?;
    let transaction = client.transaction().await?;

    let player = lock_player(&*transaction, player_id).await?;
    let (stats, _) = recalculate_locked(&*transaction, &player).await?;

    transaction.commit().await?;
    Ok(stats)
}

/// Stats as they would be after a recalculation, without storing them
pub async fn preview_player_stats(pool: &Pool, player_id: i64) -> Result<PlayerStats, DbError> {
    let client = pool.get().await?;
    // Surface a 404 rather than all-zero stats for unknown ids
    if client.query_opt("SELECT 1 FROM players WHERE id = $1", &[&player_id]).await?.is_none() {
        return Err(DbError::NotFound("player", player_id));
    }
    compute_stats(&**client, player_id).await
}

/// Recalculate every player on the roster, one transaction per player
pub async fn recalculate_all(pool: &Pool) -> Result<RecalculationReport, DbError> {
    let ids: Vec<i64> = {
        let client = pool.get().await?;
        client.query("SELECT id FROM players ORDER BY id", &[])
            .await?
            .iter()
            .map(|r| r.get("id"))
            .collect()
    };

    let mut report = RecalculationReport::default();
    let mut client = pool.get().await?;

    for id in ids {
        let transaction = client.transaction().await?;
        let player = match lock_player(&*transaction, id).await {
            Ok(p) => p,
            // Deleted since the id list was read
            Err(DbError::NotFound(..)) => continue,
            Err(e) => return Err(e),
        };
        let (_, drifted) = recalculate_locked(&*transaction, &player).await?;
        transaction.commit().await?;

        report.players_checked += 1;
        if drifted {
            report.players_updated += 1;
        }
    }

    tracing::info!(
        players_checked = %report.players_checked,
        players_updated = %report.players_updated,
        "Roster recalculation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use clubhours_core::{AddonReason, PenaltyReason};

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, h, 0, 0).unwrap()
    }

    fn player(id: i64) -> Player {
        Player {
            id,
            name: format!("Player {}", id),
            email: None,
            phone: None,
            join_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            total_hours: 0.0,
            total_sessions: 0,
            last_played: None,
            last_session_duration: None,
        }
    }

    fn session(id: i64, player_id: i64, from: u32, to: u32) -> Session {
        Session {
            id,
            player_id,
            seat_in_time: at(from),
            seat_out_time: at(to),
            duration: (to - from) as f64,
            day_of_week: "Saturday".to_string(),
            week_number: 10,
            month: 3,
            year: 2024,
        }
    }

    fn penalty(player_id: i64, minutes: i32) -> Penalty {
        Penalty {
            id: 1,
            player_id,
            penalty_minutes: minutes,
            reason: "Late".to_string(),
            reason_type: PenaltyReason::Late,
            applied_by: None,
            date_applied: at(20),
            notes: None,
        }
    }

    fn addon(player_id: i64, minutes: i32) -> Addon {
        Addon {
            id: 1,
            player_id,
            bonus_minutes: minutes,
            reason: "Promo".to_string(),
            reason_type: AddonReason::Promotion,
            applied_by: None,
            date_applied: at(20),
            notes: None,
        }
    }

    #[test]
    fn test_new_session_forces_rewrite() {
        let stored = player(1);
        let (stats, drifted) = plan_recalculation(&stored, &[session(5, 1, 18, 21)], &[], &[]);
        assert!(drifted);
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.last_played, Some(at(21)));
        assert!((stats.total_hours - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_matching_columns_skip_rewrite() {
        let mut stored = player(1);
        stored.total_hours = 2.5;
        stored.total_sessions = 1;
        stored.last_played = Some(at(21));
        stored.last_session_duration = Some(3.0);

        let (_, drifted) = plan_recalculation(
            &stored,
            &[session(5, 1, 18, 21)],
            &[penalty(1, 60)],
            &[addon(1, 30)],
        );
        assert!(!drifted);
    }

    #[test]
    fn test_deleting_last_row_resets_stats() {
        let mut stored = player(1);
        stored.total_hours = 3.0;
        stored.total_sessions = 1;
        stored.last_played = Some(at(21));
        stored.last_session_duration = Some(3.0);

        let (stats, drifted) = plan_recalculation(&stored, &[], &[], &[]);
        assert!(drifted);
        assert_eq!(stats, PlayerStats::default());
    }

    #[test]
    fn test_other_players_rows_ignored() {
        let stored = player(1);
        let (stats, drifted) = plan_recalculation(
            &stored,
            &[session(6, 2, 18, 22)],
            &[penalty(2, 30)],
            &[addon(2, 90)],
        );
        assert!(!drifted);
        assert_eq!(stats.total_sessions, 0);
    }
}
