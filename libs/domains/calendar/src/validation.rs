//! Business rules shared by the service operations.

use crate::error::{EventError, EventResult};
use crate::models::{EventId, UserId};

pub fn validate_user_id(user_id: UserId) -> EventResult<()> {
    if user_id <= 0 {
        return Err(EventError::validation("invalid user id"));
    }
    Ok(())
}

pub fn validate_event_id(id: EventId) -> EventResult<()> {
    if id <= 0 {
        return Err(EventError::validation("invalid event id"));
    }
    Ok(())
}

pub fn validate_event_text(text: &str) -> EventResult<()> {
    if text.is_empty() {
        return Err(EventError::validation("event text must not be empty"));
    }
    Ok(())
}

/// User check runs before the text check.
pub fn validate_event_data(user_id: UserId, text: &str) -> EventResult<()> {
    validate_user_id(user_id)?;
    validate_event_text(text)
}
