//! In-memory seat timers
//!
//! A timer starts at seat-in; seat-out stops it and yields the session
//! to record.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use clubhours_core::NewSession;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("player {0} is already seated")]
    AlreadySeated(i64),
    #[error("player {0} is not seated")]
    NotSeated(i64),
    #[error("seat-out for player {0} is before their seat-in")]
    SeatOutBeforeSeatIn(i64),
}

#[derive(Debug, Default)]
pub struct ActiveTable {
    seats: HashMap<i64, DateTime<Utc>>,
}

impl ActiveTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seat_in(&mut self, player_id: i64, at: DateTime<Utc>) -> Result<(), TableError> {
        if self.seats.contains_key(&player_id) {
            return Err(TableError::AlreadySeated(player_id));
        }
        self.seats.insert(player_id, at);
        tracing::debug!(player_id = %player_id, "Seated");
        Ok(())
    }

    /// Stop the player's timer. The seat is left untouched on error.
    pub fn seat_out(&mut self, player_id: i64, at: DateTime<Utc>) -> Result<NewSession, TableError> {
        let seat_in_time = *self
            .seats
            .get(&player_id)
            .ok_or(TableError::NotSeated(player_id))?;
        if at < seat_in_time {
            return Err(TableError::SeatOutBeforeSeatIn(player_id));
        }
        self.seats.remove(&player_id);

        Ok(NewSession {
            player_id,
            seat_in_time,
            seat_out_time: at,
        })
    }

    /// Hours on the clock so far, if seated
    pub fn elapsed_hours(&self, player_id: i64, now: DateTime<Utc>) -> Option<f64> {
        let since = self.seats.get(&player_id)?;
        let millis = (now - *since).num_milliseconds().max(0);
        Some(millis as f64 / 3_600_000.0)
    }

    /// Seated players ordered by seat-in time
    pub fn seated(&self) -> Vec<(i64, DateTime<Utc>)> {
        let mut seated: Vec<_> = self.seats.iter().map(|(id, at)| (*id, *at)).collect();
        seated.sort_by_key(|&(id, at)| (at, id));
        seated
    }

    pub fn is_seated(&self, player_id: i64) -> bool {
        self.seats.contains_key(&player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 14, h, m, 0).unwrap()
    }

    #[test]
    fn test_seat_in_and_out() {
        let mut table = ActiveTable::new();
        table.seat_in(7, at(19, 0)).unwrap();
        assert_eq!(table.seat_in(7, at(19, 5)), Err(TableError::AlreadySeated(7)));
        assert_eq!(table.elapsed_hours(7, at(20, 30)), Some(1.5));

        let session = table.seat_out(7, at(22, 15)).unwrap();
        assert_eq!(session.player_id, 7);
        assert_eq!(session.seat_in_time, at(19, 0));
        assert_eq!(session.seat_out_time, at(22, 15));
        assert!(!table.is_seated(7));
        assert_eq!(table.seat_out(7, at(23, 0)), Err(TableError::NotSeated(7)));
    }

    #[test]
    fn test_bad_seat_out_keeps_timer() {
        let mut table = ActiveTable::new();
        table.seat_in(3, at(18, 0)).unwrap();
        assert_eq!(table.seat_out(3, at(17, 0)), Err(TableError::SeatOutBeforeSeatIn(3)));
        assert!(table.is_seated(3));
    }

    #[test]
    fn test_seated_order() {
        let mut table = ActiveTable::new();
        table.seat_in(2, at(20, 0)).unwrap();
        table.seat_in(9, at(18, 30)).unwrap();
        table.seat_in(4, at(19, 0)).unwrap();
        let ids: Vec<i64> = table.seated().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![9, 4, 2]);
    }
}
