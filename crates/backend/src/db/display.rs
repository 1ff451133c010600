//! Aggregate read for the TV display and realtime subscribers

use chrono::{FixedOffset, Utc};
use clubhours_core::calendar::local_date;
use clubhours_core::{build_leaderboard, DisplaySnapshot};
use deadpool_postgres::Pool;
use crate::db::DbError;
use crate::db::adjustments::{load_addons, load_penalties};
use crate::db::players::load_players;
use crate::db::promotions::load_promotions;
use crate::db::sessions::load_sessions;

/// Read every table in one repeatable-read transaction
pub async fn load_snapshot(pool: &Pool, offset: FixedOffset) -> Result<DisplaySnapshot, DbError> {
    let mut client = pool.get().await?;
    let transaction = client
        .build_transaction()
        .isolation_level(tokio_postgres::IsolationLevel::RepeatableRead)
        .read_only(true)
        .start()
        .await?;

    let players = load_players(&*transaction).await?;
    let sessions = load_sessions(&*transaction, None).await?;
    let promotions = load_promotions(&*transaction).await?;
    let penalties = load_penalties(&*transaction, None).await?;
    let addons = load_addons(&*transaction, None).await?;

    transaction.commit().await?;

    let generated_at = Utc::now();
    let today = local_date(generated_at, offset);
    let leaderboards = promotions
        .iter()
        .filter(|p| p.is_running(today))
        .map(|p| build_leaderboard(p, &players, &sessions, &penalties, &addons, offset))
        .collect();

    Ok(DisplaySnapshot {
        players,
        sessions,
        promotions,
        leaderboards,
        penalties,
        addons,
        generated_at,
    })
}
