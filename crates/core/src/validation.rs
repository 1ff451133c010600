//! Input validation for form payloads

use thiserror::Error;

use crate::constants::{MAX_ADJUSTMENT_MINUTES, MAX_PLAYER_NAME_LEN};
use crate::models::{NewAddon, NewPenalty, NewPlayer, NewPromotion, Player};

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("player name is required")]
    EmptyName,
    #[error("player name is longer than {max} characters")]
    NameTooLong { max: usize },
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("a player named '{0}' already exists")]
    DuplicateName(String),
    #[error("minutes must be between 1 and {max}, got {got}")]
    MinutesOutOfRange { got: i32, max: i32 },
    #[error("a reason is required")]
    EmptyReason,
    #[error("promotion name is required")]
    EmptyPromotionName,
    #[error("promotion ends before it starts")]
    PromotionEndsBeforeStart,
    #[error("seat-out time is before seat-in time")]
    SeatOutBeforeSeatIn,
}

/// Key used for case-insensitive name comparison
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Find an existing player, other than `exclude_id`, with the same name
pub fn find_name_conflict<'a>(
    existing: &'a [Player],
    name: &str,
    exclude_id: Option<i64>,
) -> Option<&'a Player> {
    let key = normalize_name(name);
    existing
        .iter()
        .filter(|p| Some(p.id) != exclude_id)
        .find(|p| normalize_name(&p.name) == key)
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate and tidy a player form
pub fn clean_player(input: NewPlayer) -> Result<NewPlayer, ValidationError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > MAX_PLAYER_NAME_LEN {
        return Err(ValidationError::NameTooLong { max: MAX_PLAYER_NAME_LEN });
    }

    let email = blank_to_none(input.email);
    if let Some(ref e) = email {
        if !e.contains('@') {
            return Err(ValidationError::InvalidEmail(e.clone()));
        }
    }

    Ok(NewPlayer {
        name,
        email,
        phone: blank_to_none(input.phone),
        join_date: input.join_date,
    })
}

fn check_minutes(minutes: i32) -> Result<(), ValidationError> {
    if minutes < 1 || minutes > MAX_ADJUSTMENT_MINUTES {
        return Err(ValidationError::MinutesOutOfRange {
            got: minutes,
            max: MAX_ADJUSTMENT_MINUTES,
        });
    }
    Ok(())
}

pub fn clean_penalty(input: NewPenalty) -> Result<NewPenalty, ValidationError> {
    check_minutes(input.penalty_minutes)?;
    let reason = input.reason.trim().to_string();
    if reason.is_empty() {
        return Err(ValidationError::EmptyReason);
    }
    Ok(NewPenalty {
        reason,
        applied_by: blank_to_none(input.applied_by),
        notes: blank_to_none(input.notes),
        ..input
    })
}

pub fn clean_addon(input: NewAddon) -> Result<NewAddon, ValidationError> {
    check_minutes(input.bonus_minutes)?;
    let reason = input.reason.trim().to_string();
    if reason.is_empty() {
        return Err(ValidationError::EmptyReason);
    }
    Ok(NewAddon {
        reason,
        applied_by: blank_to_none(input.applied_by),
        notes: blank_to_none(input.notes),
        ..input
    })
}

pub fn clean_promotion(input: NewPromotion) -> Result<NewPromotion, ValidationError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::EmptyPromotionName);
    }
    if input.end_date < input.start_date {
        return Err(ValidationError::PromotionEndsBeforeStart);
    }
    Ok(NewPromotion { name, ..input })
}
