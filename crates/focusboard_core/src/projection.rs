//! In-memory projections of persisted entities.
//!
//! # Responsibility
//! - Hold the authoritative read state for one entity kind.
//! - Expose read-only access to view consumers; mutation stays inside the
//!   crate so every change flows through a repository operation.
//!
//! # Invariants
//! - Keys always equal the `id` of the stored entity.
//! - Mutations are synchronous and complete before the matching store write
//!   is issued.

use crate::model::board::Board;
use crate::model::card::Card;
use crate::model::list::List;
use crate::model::{BoardId, CardId, Entity, ListId};
use std::collections::HashMap;
use uuid::Uuid;

/// Id-keyed map of one entity kind.
#[derive(Debug, Clone)]
pub struct Projection<E: Entity> {
    entries: HashMap<Uuid, E>,
}

impl<E: Entity> Default for Projection<E> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<E: Entity> Projection<E> {
    pub fn get(&self, id: Uuid) -> Option<&E> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entities in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entries.values()
    }

    /// Read-only view of the underlying map.
    pub fn as_map(&self) -> &HashMap<Uuid, E> {
        &self.entries
    }

    pub(crate) fn replace_all(&mut self, entities: impl IntoIterator<Item = E>) {
        self.entries = entities
            .into_iter()
            .map(|entity| (entity.id(), entity))
            .collect();
    }

    pub(crate) fn upsert(&mut self, entity: E) -> Option<E> {
        self.entries.insert(entity.id(), entity)
    }

    pub(crate) fn remove(&mut self, id: Uuid) -> Option<E> {
        self.entries.remove(&id)
    }
}

/// Read-only view over all three projections, handed to UI consumers.
#[derive(Debug, Clone, Copy)]
pub struct KanbanView<'a> {
    pub boards: &'a Projection<Board>,
    pub lists: &'a Projection<List>,
    pub cards: &'a Projection<Card>,
}

impl<'a> KanbanView<'a> {
    pub fn board(&self, id: BoardId) -> Option<&'a Board> {
        self.boards.get(id)
    }

    pub fn list(&self, id: ListId) -> Option<&'a List> {
        self.lists.get(id)
    }

    pub fn card(&self, id: CardId) -> Option<&'a Card> {
        self.cards.get(id)
    }

    /// Lists of a board in display order. Unresolvable ids are skipped.
    pub fn board_lists(&self, board_id: BoardId) -> Vec<&'a List> {
        self.boards
            .get(board_id)
            .map(|board| {
                board
                    .list_order
                    .iter()
                    .filter_map(|id| self.lists.get(*id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Cards of a list in display order. Unresolvable ids are skipped.
    pub fn list_cards(&self, list_id: ListId) -> Vec<&'a Card> {
        self.lists
            .get(list_id)
            .map(|list| {
                list.card_order
                    .iter()
                    .filter_map(|id| self.cards.get(*id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Boards sorted by name, then id, for stable presentation.
    pub fn boards_by_name(&self) -> Vec<&'a Board> {
        let mut boards: Vec<&Board> = self.boards.iter().collect();
        boards.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        boards
    }

    /// Estimated and actual hours summed over a list's cards.
    pub fn list_time_summary(&self, list_id: ListId) -> TimeSummary {
        self.list_cards(list_id)
            .iter()
            .fold(TimeSummary::default(), |sum, card| TimeSummary {
                estimated: sum.estimated + card.spent_time.estimated,
                actual: sum.actual + card.spent_time.actual,
            })
    }

    /// Finds the list whose `cardOrder` contains `card_id`.
    pub fn owning_list(&self, card_id: CardId) -> Option<&'a List> {
        self.lists
            .iter()
            .find(|list| list.card_order.contains(&card_id))
    }

    /// Finds the board whose `listOrder` contains `list_id`.
    pub fn owning_board(&self, list_id: ListId) -> Option<&'a Board> {
        self.boards
            .iter()
            .find(|board| board.list_order.contains(&list_id))
    }
}

/// Hour totals for a group of cards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeSummary {
    pub estimated: f64,
    pub actual: f64,
}
