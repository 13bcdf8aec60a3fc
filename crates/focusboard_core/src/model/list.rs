//! List entity.

use super::{CardId, Entity, ListId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted field names.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const CARD_ORDER: &str = "cardOrder";
}

/// Named ordered container of cards within a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: ListId,
    pub title: String,
    /// Card ids in display order.
    #[serde(default)]
    pub card_order: Vec<CardId>,
}

impl List {
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title)
    }

    pub fn with_id(id: ListId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            card_order: Vec::new(),
        }
    }

    /// Returns the position of `card_id` in `card_order`.
    pub fn card_position(&self, card_id: CardId) -> Option<usize> {
        self.card_order.iter().position(|id| *id == card_id)
    }
}

impl Entity for List {
    const COLLECTION: &'static str = "lists";
    const KIND: &'static str = "list";

    fn id(&self) -> Uuid {
        self.id
    }
}
