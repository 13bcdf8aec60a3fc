//! Board entity.

use super::{BoardId, Entity, ListId, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Titles of the lists every new board starts with.
pub const DEFAULT_LIST_TITLES: [&str; 3] = ["TODO", "In Progress", "Done"];
/// Index in `DEFAULT_LIST_TITLES` of the list a new board focuses.
pub const DEFAULT_FOCUSED_LIST_INDEX: usize = 1;

/// Persisted field names.
pub mod fields {
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const LIST_ORDER: &str = "listOrder";
    pub const FOCUSED_LIST_ID: &str = "focusedListId";
    pub const RELATED_SESSION_IDS: &str = "relatedSessionIds";
    pub const SPENT_HOURS: &str = "spentHours";
    pub const AGG_INFO: &str = "aggInfo";
}

/// Top-level container owning an ordered set of lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// List ids in display order.
    #[serde(default)]
    pub list_order: Vec<ListId>,
    /// Must be a member of `list_order` when set.
    #[serde(default)]
    pub focused_list_id: Option<ListId>,
    #[serde(default)]
    pub related_session_ids: Vec<SessionId>,
    /// Only grows, except through an explicit edit.
    #[serde(default)]
    pub spent_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agg_info: Option<AggInfo>,
}

impl Board {
    /// Creates an empty board with a generated id.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, description)
    }

    /// Creates an empty board with a caller-provided id.
    pub fn with_id(id: BoardId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            list_order: Vec::new(),
            focused_list_id: None,
            related_session_ids: Vec::new(),
            spent_hours: 0.0,
            agg_info: None,
        }
    }

    /// Returns the position of `list_id` in `list_order`.
    pub fn list_position(&self, list_id: ListId) -> Option<usize> {
        self.list_order.iter().position(|id| *id == list_id)
    }
}

impl Entity for Board {
    const COLLECTION: &'static str = "boards";
    const KIND: &'static str = "board";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Activity aggregate computed by the activity monitor for one board.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggInfo {
    /// Unix epoch milliseconds.
    pub last_updated_time: i64,
    pub spent_time: f64,
    #[serde(default)]
    pub app_spent_time: BTreeMap<String, f64>,
    #[serde(default)]
    pub keyword_weights: BTreeMap<String, f64>,
}
