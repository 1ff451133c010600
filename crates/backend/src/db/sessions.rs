//! Session database operations

use chrono::FixedOffset;
use clubhours_core::{session_duration_hours, CalendarFields, NewSession, Session, ValidationError};
use deadpool_postgres::Pool;
use tokio_postgres::{GenericClient, Row};
use crate::db::DbError;
use crate::db::stats::{lock_player, recalculate_locked};

const SESSION_COLUMNS: &str = "id, player_id, seat_in_time, seat_out_time, duration, \
                               day_of_week, week_number, month, year";

fn session_from_row(row: &Row) -> Session {
    Session {
        id: row.get("id"),
        player_id: row.get("player_id"),
        seat_in_time: row.get("seat_in_time"),
        seat_out_time: row.get("seat_out_time"),
        duration: row.get("duration"),
        day_of_week: row.get("day_of_week"),
        week_number: row.get("week_number"),
        month: row.get("month"),
        year: row.get("year"),
    }
}

/// Load sessions, newest first, optionally for one player
pub(crate) async fn load_sessions<C: GenericClient + Sync>(
    client: &C,
    player_id: Option<i64>,
) -> Result<Vec<Session>, DbError> {
    let sql = format!(
        r#"
        SELECT {}
        FROM sessions
        WHERE $1::BIGINT IS NULL OR player_id = $1
        ORDER BY seat_out_time DESC, id DESC
        "#,
        SESSION_COLUMNS
    );
    let rows = client.query(sql.as_str(), &[&player_id]).await?;

    Ok(rows.iter().map(session_from_row).collect())
}

pub async fn list_sessions(pool: &Pool, player_id: Option<i64>) -> Result<Vec<Session>, DbError> {
    let client = pool.get().await?;
    load_sessions(&**client, player_id).await
}

/// Record a finished session and fold it into the player's totals
pub async fn insert_session(
    pool: &Pool,
    session: &NewSession,
    offset: FixedOffset,
) -> Result<Session, DbError> {
    let duration = session_duration_hours(session.seat_in_time, session.seat_out_time)
        .map_err(|_| ValidationError::SeatOutBeforeSeatIn)?;
    let calendar = CalendarFields::derive(session.seat_in_time, offset);

    let mut client = pool.get().await?;
    let transaction = client.transaction().await?;

    let player = lock_player(&*transaction, session.player_id).await?;

    let sql = format!(
        r#"
        INSERT INTO sessions (player_id, seat_in_time, seat_out_time, duration,
                              day_of_week, week_number, month, year)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {}
        "#,
        SESSION_COLUMNS
    );
    let row = transaction.query_one(
        sql.as_str(),
        &[
            &session.player_id,
            &session.seat_in_time,
            &session.seat_out_time,
            &duration,
            &calendar.day_of_week,
            &calendar.week_number,
            &calendar.month,
            &calendar.year,
        ]
    ).await?;

    recalculate_locked(&*transaction, &player).await?;
    transaction.commit().await?;

    let created = session_from_row(&row);
    tracing::info!(
        session_id = %created.id,
        player_id = %created.player_id,
        duration = %created.duration,
        "Session recorded"
    );
    Ok(created)
}

/// Delete a session and recalculate its player
pub async fn delete_session(pool: &Pool, id: i64) -> Result<i64, DbError> {
    let mut client = pool.get().await?;
    let transaction = client.transaction().await?;

    let player_id: i64 = transaction
        .query_opt("SELECT player_id FROM sessions WHERE id = $1", &[&id])
        .await?
        .map(|r| r.get("player_id"))
        .ok_or(DbError::NotFound("session", id))?;

    let player = lock_player(&*transaction, player_id).await?;
    transaction.execute("DELETE FROM sessions WHERE id = $1", &[&id]).await?;
    recalculate_locked(&*transaction, &player).await?;

    transaction.commit().await?;

    tracing::info!(session_id = %id, player_id = %player_id, "Session deleted");
    Ok(player_id)
}
