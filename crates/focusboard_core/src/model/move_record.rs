//! Audit record of one card moving between lists.

use super::{CardId, Entity, ListId};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Immutable, write-only move history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub id: Uuid,
    pub from_list_id: ListId,
    pub to_list_id: ListId,
    pub card_id: CardId,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
}

impl MoveRecord {
    /// Creates a record stamped with the current wall clock.
    pub fn now(from_list_id: ListId, to_list_id: ListId, card_id: CardId) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_list_id,
            to_list_id,
            card_id,
            timestamp: now_epoch_ms(),
        }
    }
}

impl Entity for MoveRecord {
    const COLLECTION: &'static str = "moves";
    const KIND: &'static str = "move";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Current wall clock in Unix epoch milliseconds; 0 if the clock is before
/// the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
