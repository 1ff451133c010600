//! Promotion database operations

use chrono::FixedOffset;
use clubhours_core::{build_leaderboard, NewPromotion, Promotion, PromotionLeaderboard};
use deadpool_postgres::Pool;
use tokio_postgres::{GenericClient, Row};
use crate::db::DbError;
use crate::db::adjustments::{load_addons, load_penalties};
use crate::db::players::load_players;
use crate::db::sessions::load_sessions;

fn promotion_from_row(row: &Row) -> Promotion {
    Promotion {
        id: row.get("id"),
        name: row.get("name"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        active: row.get("active"),
        deleted: row.get("deleted"),
        created_at: row.get("created_at"),
    }
}

/// Promotions that have not been soft-deleted, newest window first
pub(crate) async fn load_promotions<C: GenericClient + Sync>(client: &C) -> Result<Vec<Promotion>, DbError> {
    let rows = client.query(
        r#"
        SELECT id, name, start_date, end_date, active, deleted, created_at
        FROM promotions
        WHERE NOT deleted
        ORDER BY start_date DESC, id DESC
        "#,
        &[]
    ).await?;

    Ok(rows.iter().map(promotion_from_row).collect())
}

pub async fn list_promotions(pool: &Pool) -> Result<Vec<Promotion>, DbError> {
    let client = pool.get().await?;
    load_promotions(&**client).await
}

pub async fn get_promotion(pool: &Pool, id: i64) -> Result<Promotion, DbError> {
    let client = pool.get().await?;

    let row = client.query_opt(
        r#"
        SELECT id, name, start_date, end_date, active, deleted, created_at
        FROM promotions
        WHERE id = $1 AND NOT deleted
        "#,
        &[&id]
    ).await?;

    row.map(|r| promotion_from_row(&r))
        .ok_or(DbError::NotFound("promotion", id))
}

pub async fn insert_promotion(pool: &Pool, promotion: &NewPromotion) -> Result<Promotion, DbError> {
    let client = pool.get().await?;

    let row = client.query_one(
        r#"
        INSERT INTO promotions (name, start_date, end_date, active)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, start_date, end_date, active, deleted, created_at
        "#,
        &[&promotion.name, &promotion.start_date, &promotion.end_date, &promotion.active]
    ).await?;

    let created = promotion_from_row(&row);
    tracing::info!(promotion_id = %created.id, name = %created.name, "Promotion created");
    Ok(created)
}

pub async fn update_promotion(
    pool: &Pool,
    id: i64,
    promotion: &NewPromotion,
) -> Result<Promotion, DbError> {
    let client = pool.get().await?;

    let row = client.query_opt(
        r#"
        UPDATE promotions SET
            name = $2,
            start_date = $3,
            end_date = $4,
            active = $5
        WHERE id = $1 AND NOT deleted
        RETURNING id, name, start_date, end_date, active, deleted, created_at
        "#,
        &[&id, &promotion.name, &promotion.start_date, &promotion.end_date, &promotion.active]
    ).await?;

    row.map(|r| promotion_from_row(&r))
        .ok_or(DbError::NotFound("promotion", id))
}

pub async fn set_promotion_active(pool: &Pool, id: i64, active: bool) -> Result<Promotion, DbError> {
    let client = pool.get().await?;

    let row = client.query_opt(
        r#"
        UPDATE promotions SET active = $2
        WHERE id = $1 AND NOT deleted
        RETURNING id, name, start_date, end_date, active, deleted, created_at
        "#,
        &[&id, &active]
    ).await?;

    row.map(|r| promotion_from_row(&r))
        .ok_or(DbError::NotFound("promotion", id))
}

/// Soft delete: the row stays but disappears from listings
pub async fn soft_delete_promotion(pool: &Pool, id: i64) -> Result<(), DbError> {
    let client = pool.get().await?;

    let updated = client.execute(
        "UPDATE promotions SET deleted = TRUE, active = FALSE WHERE id = $1 AND NOT deleted",
        &[&id]
    ).await?;
    if updated == 0 {
        return Err(DbError::NotFound("promotion", id));
    }

    tracing::info!(promotion_id = %id, "Promotion deleted");
    Ok(())
}

/// Leaderboard for one promotion, computed from current rows
pub async fn get_leaderboard(
    pool: &Pool,
    id: i64,
    offset: FixedOffset,
) -> Result<PromotionLeaderboard, DbError> {
    let promotion = get_promotion(pool, id).await?;

    let client = pool.get().await?;
    let players = load_players(&**client).await?;
    let sessions = load_sessions(&**client, None).await?;
    let penalties = load_penalties(&**client, None).await?;
    let addons = load_addons(&**client, None).await?;

    Ok(build_leaderboard(&promotion, &players, &sessions, &penalties, &addons, offset))
}
