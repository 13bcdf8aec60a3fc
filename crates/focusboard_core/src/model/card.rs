//! Card entity.

use super::{CardId, Entity, SessionId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted field names.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const CONTENT: &str = "content";
    pub const SESSION_IDS: &str = "sessionIds";
    pub const SPENT_TIME_ESTIMATED: &str = "spentTime.estimated";
    pub const SPENT_TIME_ACTUAL: &str = "spentTime.actual";
}

/// Task unit with content and time tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Timer sessions this card took part in.
    #[serde(default)]
    pub session_ids: Vec<SessionId>,
    #[serde(default)]
    pub spent_time: SpentTime,
}

impl Card {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title, content)
    }

    pub fn with_id(id: CardId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            session_ids: Vec::new(),
            spent_time: SpentTime::default(),
        }
    }
}

impl Entity for Card {
    const COLLECTION: &'static str = "cards";
    const KIND: &'static str = "card";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Hours estimated for and actually spent on one card.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpentTime {
    pub estimated: f64,
    /// Only grows, except through an explicit overwrite.
    pub actual: f64,
}
