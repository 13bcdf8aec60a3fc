//! Kanban domain model: boards, lists, cards and the records they produce.
//!
//! # Responsibility
//! - Define the persisted entity shapes (one JSON document per entity).
//! - Name the persisted fields that update operators address.
//!
//! # Invariants
//! - No entity stores its parent id; membership in the parent's order array
//!   is the only ownership link.
//! - Order arrays (`listOrder`, `cardOrder`) never contain duplicates.

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

pub mod board;
pub mod card;
pub mod list;
pub mod move_record;
pub mod session;

/// Board identifier.
pub type BoardId = Uuid;
/// List identifier.
pub type ListId = Uuid;
/// Card identifier.
pub type CardId = Uuid;
/// Opaque timer-session identifier supplied by the timer subsystem.
pub type SessionId = String;

/// A record kept in its own document collection.
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// Collection name in the document store.
    const COLLECTION: &'static str;
    /// Short kind name used in logs and errors.
    const KIND: &'static str;

    /// Stable entity id; also the document key.
    fn id(&self) -> Uuid;
}
