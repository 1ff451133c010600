//! Player roster database operations

use chrono::Utc;
use clubhours_core::validation::find_name_conflict;
use clubhours_core::{NewPlayer, Player, ValidationError};
use deadpool_postgres::Pool;
use tokio_postgres::{GenericClient, Row};
use crate::db::DbError;

const PLAYER_COLUMNS: &str = "id, name, email, phone, join_date, total_hours, total_sessions, \
                              last_played, last_session_duration";

pub(crate) fn player_from_row(row: &Row) -> Player {
    Player {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        join_date: row.get("join_date"),
        total_hours: row.get("total_hours"),
        total_sessions: row.get("total_sessions"),
        last_played: row.get("last_played"),
        last_session_duration: row.get("last_session_duration"),
    }
}

pub(crate) async fn load_players<C: GenericClient + Sync>(client: &C) -> Result<Vec<Player>, DbError> {
    let sql = format!("SELECT {} FROM players ORDER BY lower(name)", PLAYER_COLUMNS);
    let rows = client.query(sql.as_str(), &[]).await?;

    Ok(rows.iter().map(player_from_row).collect())
}

/// Get the full roster, alphabetically
pub async fn list_players(pool: &Pool) -> Result<Vec<Player>, DbError> {
    let client = pool.get().await?;
    load_players(&**client).await
}

pub async fn get_player(pool: &Pool, id: i64) -> Result<Player, DbError> {
    let client = pool.get().await?;

    let sql = format!("SELECT {} FROM players WHERE id = $1", PLAYER_COLUMNS);
    let row = client.query_opt(sql.as_str(), &[&id]).await?;

    row.map(|r| player_from_row(&r))
        .ok_or(DbError::NotFound("player", id))
}

/// Reject `name` if another player already uses it, ignoring case
async fn ensure_name_free<C: GenericClient + Sync>(
    client: &C,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<(), DbError> {
    let sql = format!("SELECT {} FROM players WHERE lower(name) = lower($1)", PLAYER_COLUMNS);
    let rows = client.query(sql.as_str(), &[&name]).await?;
    let existing: Vec<Player> = rows.iter().map(player_from_row).collect();

    match find_name_conflict(&existing, name, exclude_id) {
        Some(p) => Err(ValidationError::DuplicateName(p.name.clone()).into()),
        None => Ok(()),
    }
}

fn map_unique_violation(e: tokio_postgres::Error, name: &str) -> DbError {
    let err = DbError::from(e);
    if err.is_unique_violation() {
        DbError::Invalid(ValidationError::DuplicateName(name.to_string()))
    } else {
        err
    }
}

/// Insert an already-validated player
pub async fn insert_player(pool: &Pool, player: &NewPlayer) -> Result<Player, DbError> {
    let client = pool.get().await?;
    ensure_name_free(&**client, &player.name, None).await?;

    let join_date = player.join_date.unwrap_or_else(|| Utc::now().date_naive());

    // The unique index still catches a concurrent insert of the same name
    let sql = format!(
        r#"
        INSERT INTO players (name, email, phone, join_date)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        PLAYER_COLUMNS
    );
    let row = client
        .query_one(sql.as_str(), &[&player.name, &player.email, &player.phone, &join_date])
        .await
        .map_err(|e| map_unique_violation(e, &player.name))?;

    tracing::info!(player_id = %row.get::<_, i64>("id"), name = %player.name, "Player created");
    Ok(player_from_row(&row))
}

/// Update contact details; stats columns are left to the recalculation
pub async fn update_player(pool: &Pool, id: i64, player: &NewPlayer) -> Result<Player, DbError> {
    let client = pool.get().await?;
    ensure_name_free(&**client, &player.name, Some(id)).await?;

    let sql = format!(
        r#"
        UPDATE players SET
            name = $2,
            email = $3,
            phone = $4,
            join_date = COALESCE($5, join_date)
        WHERE id = $1
        RETURNING {}
        "#,
        PLAYER_COLUMNS
    );
    let row = client
        .query_opt(sql.as_str(), &[&id, &player.name, &player.email, &player.phone, &player.join_date])
        .await
        .map_err(|e| map_unique_violation(e, &player.name))?;

    row.map(|r| player_from_row(&r))
        .ok_or(DbError::NotFound("player", id))
}

/// Delete a player; sessions and adjustments go with it via cascade
pub async fn delete_player(pool: &Pool, id: i64) -> Result<(), DbError> {
    let client = pool.get().await?;

    let deleted = client.execute("DELETE FROM players WHERE id = $1", &[&id]).await?;
    if deleted == 0 {
        return Err(DbError::NotFound("player", id));
    }

    tracing::info!(player_id = %id, "Player deleted");
    Ok(())
}
