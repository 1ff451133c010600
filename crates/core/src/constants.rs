//! Limits and tunables shared by server and client

/// Two stat values closer than this are treated as equal (hours)
pub const HOURS_EPSILON: f64 = 1e-6;

/// Longest accepted player name, in characters
pub const MAX_PLAYER_NAME_LEN: usize = 100;

/// Largest single penalty or addon, in minutes (one full day)
pub const MAX_ADJUSTMENT_MINUTES: i32 = 24 * 60;

/// How many times an offline operation is tried before it is dropped
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
