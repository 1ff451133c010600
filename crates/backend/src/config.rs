//! Server configuration from environment variables (and `.env`)

use chrono::FixedOffset;
use clubhours_core::calendar::offset_from_minutes;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_REALTIME_BUFFER: usize = 64;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db: deadpool_postgres::Config,
    pub bind_address: String,
    /// Club-local offset used for calendar fields and promotion windows
    pub club_offset: FixedOffset,
    /// Capacity of the realtime broadcast channel
    pub realtime_buffer: usize,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut db = deadpool_postgres::Config::new();
        db.host = lookup("DB_HOST");
        db.port = lookup("DB_PORT").and_then(|p| p.parse().ok());
        db.dbname = lookup("DB_NAME");
        db.user = lookup("DB_USER");
        db.password = lookup("DB_PASSWORD");

        let offset_minutes = lookup("CLUB_UTC_OFFSET_MINUTES")
            .and_then(|v| v.trim().parse::<i32>().ok())
            .unwrap_or(0);

        Self {
            db,
            bind_address: lookup("BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            club_offset: offset_from_minutes(offset_minutes),
            realtime_buffer: lookup("REALTIME_BUFFER")
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(DEFAULT_REALTIME_BUFFER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_address, "0.0.0.0:8080");
        assert_eq!(cfg.club_offset.local_minus_utc(), 0);
        assert_eq!(cfg.realtime_buffer, 64);
        assert!(cfg.db.host.is_none());
    }

    #[test]
    fn test_reads_values() {
        let cfg = config(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("BIND_ADDRESS", "127.0.0.1:9000"),
            ("CLUB_UTC_OFFSET_MINUTES", "-300"),
            ("REALTIME_BUFFER", "0"),
        ]);
        assert_eq!(cfg.db.host.as_deref(), Some("db.internal"));
        assert_eq!(cfg.db.port, Some(6543));
        assert_eq!(cfg.bind_address, "127.0.0.1:9000");
        assert_eq!(cfg.club_offset.local_minus_utc(), -300 * 60);
        assert_eq!(cfg.realtime_buffer, 64);
    }
}
