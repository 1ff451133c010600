//! Table definitions, applied idempotently at startup

use deadpool_postgres::Pool;
use crate::db::DbError;

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    join_date DATE NOT NULL DEFAULT CURRENT_DATE,
    total_hours DOUBLE PRECISION NOT NULL DEFAULT 0,
    total_sessions INTEGER NOT NULL DEFAULT 0,
    last_played TIMESTAMPTZ,
    last_session_duration DOUBLE PRECISION
);

CREATE UNIQUE INDEX IF NOT EXISTS players_name_lower_idx ON players (lower(name));

CREATE TABLE IF NOT EXISTS sessions (
    id BIGSERIAL PRIMARY KEY,
    player_id BIGINT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
    seat_in_time TIMESTAMPTZ NOT NULL,
    seat_out_time TIMESTAMPTZ NOT NULL,
    duration DOUBLE PRECISION NOT NULL,
    day_of_week TEXT NOT NULL,
    week_number INTEGER NOT NULL,
    month INTEGER NOT NULL,
    year INTEGER NOT NULL,
    CHECK (seat_out_time >= seat_in_time)
);

CREATE INDEX IF NOT EXISTS sessions_player_idx ON sessions (player_id);

CREATE TABLE IF NOT EXISTS promotions (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    deleted BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (end_date >= start_date)
);

CREATE TABLE IF NOT EXISTS penalties (
    id BIGSERIAL PRIMARY KEY,
    player_id BIGINT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
    penalty_minutes INTEGER NOT NULL CHECK (penalty_minutes > 0),
    reason TEXT NOT NULL,
    reason_type TEXT NOT NULL DEFAULT 'other',
    applied_by TEXT,
    date_applied TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    notes TEXT
);

CREATE INDEX IF NOT EXISTS penalties_player_idx ON penalties (player_id);

CREATE TABLE IF NOT EXISTS addons (
    id BIGSERIAL PRIMARY KEY,
    player_id BIGINT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
    bonus_minutes INTEGER NOT NULL CHECK (bonus_minutes > 0),
    reason TEXT NOT NULL,
    reason_type TEXT NOT NULL DEFAULT 'other',
    applied_by TEXT,
    date_applied TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    notes TEXT
);

CREATE INDEX IF NOT EXISTS addons_player_idx ON addons (player_id);
"#;

/// Create any missing tables and indexes
pub async fn ensure_schema(pool: &Pool) -> Result<(), DbError> {
    let client = pool.get().await?;
    client.batch_execute(SCHEMA).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_every_table() {
        for table in ["players", "sessions", "promotions", "penalties", "addons"] {
            assert!(SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table)));
        }
    }

    #[test]
    fn child_tables_cascade_on_player_delete() {
        assert_eq!(SCHEMA.matches("REFERENCES players(id) ON DELETE CASCADE").count(), 3);
    }
}
