//! Completed timer session event.
//!
//! # Invariants
//! - `duration_hours` is finite and non-negative; board and card time
//!   counters only grow through this event.

use super::{BoardId, CardId, SessionId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Emitted by the timer subsystem once per completed focus session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCompleted {
    pub board_id: BoardId,
    pub session_id: SessionId,
    pub duration_hours: f64,
    /// Cards worked on during the session. Order carries no meaning.
    #[serde(default)]
    pub card_ids: Vec<CardId>,
}

impl SessionCompleted {
    /// Validates event-level invariants.
    pub fn validate(&self) -> Result<(), SessionValidationError> {
        if self.session_id.trim().is_empty() {
            return Err(SessionValidationError::EmptySessionId);
        }
        if !self.duration_hours.is_finite() {
            return Err(SessionValidationError::NonFiniteDuration);
        }
        if self.duration_hours < 0.0 {
            return Err(SessionValidationError::NegativeDuration(self.duration_hours));
        }
        Ok(())
    }

    /// Card ids with duplicates removed, first occurrence kept.
    pub fn distinct_card_ids(&self) -> Vec<CardId> {
        let mut seen = Vec::with_capacity(self.card_ids.len());
        for card_id in &self.card_ids {
            if !seen.contains(card_id) {
                seen.push(*card_id);
            }
        }
        seen
    }
}

/// Session event validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionValidationError {
    EmptySessionId,
    NonFiniteDuration,
    NegativeDuration(f64),
}

impl Display for SessionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySessionId => write!(f, "session id must not be blank"),
            Self::NonFiniteDuration => write!(f, "session duration must be finite"),
            Self::NegativeDuration(value) => {
                write!(f, "session duration must not be negative, got {value}")
            }
        }
    }
}

impl Error for SessionValidationError {}
