//! Penalty and addon database operations
//!
//! Adjustments are never edited. Writing or deleting one recalculates
//! the owning player in the same transaction.

use clubhours_core::{Addon, AddonReason, NewAddon, NewPenalty, Penalty, PenaltyReason};
use deadpool_postgres::Pool;
use tokio_postgres::{GenericClient, Row};
use crate::db::DbError;
use crate::db::stats::{lock_player, recalculate_locked};

fn penalty_from_row(row: &Row) -> Penalty {
    Penalty {
        id: row.get("id"),
        player_id: row.get("player_id"),
        penalty_minutes: row.get("penalty_minutes"),
        reason: row.get("reason"),
        reason_type: PenaltyReason::from_db(row.get("reason_type")),
        applied_by: row.get("applied_by"),
        date_applied: row.get("date_applied"),
        notes: row.get("notes"),
    }
}

fn addon_from_row(row: &Row) -> Addon {
    Addon {
        id: row.get("id"),
        player_id: row.get("player_id"),
        bonus_minutes: row.get("bonus_minutes"),
        reason: row.get("reason"),
        reason_type: AddonReason::from_db(row.get("reason_type")),
        applied_by: row.get("applied_by"),
        date_applied: row.get("date_applied"),
        notes: row.get("notes"),
    }
}

pub(crate) async fn load_penalties<C: GenericClient + Sync>(
    client: &C,
    player_id: Option<i64>,
) -> Result<Vec<Penalty>, DbError> {
    let rows = client.query(
        r#"
        SELECT id, player_id, penalty_minutes, reason, reason_type, applied_by, date_applied, notes
        FROM penalties
        WHERE $1::BIGINT IS NULL OR player_id = $1
        ORDER BY date_applied DESC, id DESC
        "#,
        &[&player_id]
    ).await?;

    Ok(rows.iter().map(penalty_from_row).collect())
}

pub(crate) async fn load_addons<C: GenericClient + Sync>(
    client: &C,
    player_id: Option<i64>,
) -> Result<Vec<Addon>, DbError> {
    let rows = client.query(
        r#"
        SELECT id, player_id, bonus_minutes, reason, reason_type, applied_by, date_applied, notes
        FROM addons
        WHERE $1::BIGINT IS NULL OR player_id = $1
        ORDER BY date_applied DESC, id DESC
        "#,
        &[&player_id]
    ).await?;

    Ok(rows.iter().map(addon_from_row).collect())
}

pub async fn list_penalties(pool: &Pool, player_id: Option<i64>) -> Result<Vec<Penalty>, DbError> {
    let client = pool.get().await?;
    load_penalties(&**client, player_id).await
}

pub async fn list_addons(pool: &Pool, player_id: Option<i64>) -> Result<Vec<Addon>, DbError> {
    let client = pool.get().await?;
    load_addons(&**client, player_id).await
}

pub async fn insert_penalty(pool: &Pool, penalty: &NewPenalty) -> Result<Penalty, DbError> {
    let mut client = pool.get().await?;
    let transaction = client.transaction().await?;

    let player = lock_player(&*transaction, penalty.player_id).await?;

    let row = transaction.query_one(
        r#"
        INSERT INTO penalties (player_id, penalty_minutes, reason, reason_type, applied_by, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, player_id, penalty_minutes, reason, reason_type, applied_by, date_applied, notes
        "#,
        &[
            &penalty.player_id,
            &penalty.penalty_minutes,
            &penalty.reason,
            &penalty.reason_type.as_str(),
            &penalty.applied_by,
            &penalty.notes,
        ]
    ).await?;

    recalculate_locked(&*transaction, &player).await?;
    transaction.commit().await?;

    tracing::info!(
        player_id = %penalty.player_id,
        minutes = %penalty.penalty_minutes,
        reason_type = %penalty.reason_type.as_str(),
        "Penalty applied"
    );
    Ok(penalty_from_row(&row))
}

pub async fn insert_addon(pool: &Pool, addon: &NewAddon) -> Result<Addon, DbError> {
    let mut client = pool.get().await?;
    let transaction = client.transaction().await?;

    let player = lock_player(&*transaction, addon.player_id).await?;

    let row = transaction.query_one(
        r#"
        INSERT INTO addons (player_id, bonus_minutes, reason, reason_type, applied_by, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, player_id, bonus_minutes, reason, reason_type, applied_by, date_applied, notes
        "#,
        &[
            &addon.player_id,
            &addon.bonus_minutes,
            &addon.reason,
            &addon.reason_type.as_str(),
            &addon.applied_by,
            &addon.notes,
        ]
    ).await?;

    recalculate_locked(&*transaction, &player).await?;
    transaction.commit().await?;

    tracing::info!(
        player_id = %addon.player_id,
        minutes = %addon.bonus_minutes,
        reason_type = %addon.reason_type.as_str(),
        "Addon applied"
    );
    Ok(addon_from_row(&row))
}

/// Which adjustment table a delete targets
#[derive(Debug, Clone, Copy)]
pub enum AdjustmentKind {
    Penalty,
    Addon,
}

impl AdjustmentKind {
    fn table(self) -> &'static str {
        match self {
            AdjustmentKind::Penalty => "penalties",
            AdjustmentKind::Addon => "addons",
        }
    }

    fn label(self) -> &'static str {
        match self {
            AdjustmentKind::Penalty => "penalty",
            AdjustmentKind::Addon => "addon",
        }
    }
}

/// Delete a penalty or addon and recalculate its player
pub async fn delete_adjustment(pool: &Pool, kind: AdjustmentKind, id: i64) -> Result<i64, DbError> {
    let mut client = pool.get().await?;
    let transaction = client.transaction().await?;

    let select = format!("SELECT player_id FROM {} WHERE id = $1", kind.table());
    let player_id: i64 = transaction
        .query_opt(select.as_str(), &[&id])
        .await?
        .map(|r| r.get("player_id"))
        .ok_or(DbError::NotFound(kind.label(), id))?;

    let player = lock_player(&*transaction, player_id).await?;
    let delete = format!("DELETE FROM {} WHERE id = $1", kind.table());
    transaction.execute(delete.as_str(), &[&id]).await?;
    recalculate_locked(&*transaction, &player).await?;

    transaction.commit().await?;

    tracing::info!(kind = %kind.label(), id = %id, player_id = %player_id, "Adjustment deleted");
    Ok(player_id)
}
