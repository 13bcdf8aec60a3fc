//! Projection integrity checks.
//!
//! # Responsibility
//! - Report violations of the hierarchy invariants visible in the
//!   projections.
//!
//! # Invariants
//! - Orphaned lists and cards (reachable from no parent) are not violations;
//!   board deletes leave them behind on purpose.
//! - Reports are sorted so repeated checks compare equal.

use crate::model::{BoardId, CardId, ListId};
use crate::projection::KanbanView;
use std::collections::{HashMap, HashSet};

/// One broken hierarchy invariant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntegrityViolation {
    /// `listOrder` references a list with no record.
    MissingList { board_id: BoardId, list_id: ListId },
    /// `cardOrder` references a card with no record.
    MissingCard { list_id: ListId, card_id: CardId },
    /// `listOrder` contains the same id more than once.
    DuplicateListId { board_id: BoardId, list_id: ListId },
    /// `cardOrder` contains the same id more than once.
    DuplicateCardId { list_id: ListId, card_id: CardId },
    /// A card id appears in more than one list.
    CardInMultipleLists { card_id: CardId, list_ids: Vec<ListId> },
    /// A list id appears in more than one board.
    ListOnMultipleBoards { list_id: ListId, board_ids: Vec<BoardId> },
    /// `focusedListId` is not a member of `listOrder`.
    FocusedListDetached { board_id: BoardId, list_id: ListId },
}

/// Checks every board and list in `view`.
pub fn check_integrity(view: &KanbanView<'_>) -> Vec<IntegrityViolation> {
    let mut violations = Vec::new();

    let mut boards_by_list: HashMap<ListId, Vec<BoardId>> = HashMap::new();
    for board in view.boards.iter() {
        let mut seen = HashSet::new();
        for list_id in &board.list_order {
            if seen.insert(*list_id) {
                boards_by_list.entry(*list_id).or_default().push(board.id);
            } else {
                violations.push(IntegrityViolation::DuplicateListId {
                    board_id: board.id,
                    list_id: *list_id,
                });
            }
            if !view.lists.contains(*list_id) {
                violations.push(IntegrityViolation::MissingList {
                    board_id: board.id,
                    list_id: *list_id,
                });
            }
        }
        if let Some(focused) = board.focused_list_id {
            if !seen.contains(&focused) {
                violations.push(IntegrityViolation::FocusedListDetached {
                    board_id: board.id,
                    list_id: focused,
                });
            }
        }
    }

    let mut owners: HashMap<CardId, Vec<ListId>> = HashMap::new();
    for list in view.lists.iter() {
        let mut seen = HashSet::new();
        for card_id in &list.card_order {
            if !seen.insert(*card_id) {
                violations.push(IntegrityViolation::DuplicateCardId {
                    list_id: list.id,
                    card_id: *card_id,
                });
                continue;
            }
            owners.entry(*card_id).or_default().push(list.id);
            if !view.cards.contains(*card_id) {
                violations.push(IntegrityViolation::MissingCard {
                    list_id: list.id,
                    card_id: *card_id,
                });
            }
        }
    }

    for (card_id, mut list_ids) in owners {
        if list_ids.len() > 1 {
            list_ids.sort();
            violations.push(IntegrityViolation::CardInMultipleLists { card_id, list_ids });
        }
    }

    for (list_id, mut board_ids) in boards_by_list {
        if board_ids.len() > 1 {
            board_ids.sort();
            violations.push(IntegrityViolation::ListOnMultipleBoards { list_id, board_ids });
        }
    }

    violations.sort();
    violations
}
