//! Cascade coordinator for cross-entity deletes and session fan-out.
//!
//! # Responsibility
//! - Own the ownership rules: a board owns list ids, a list owns card ids.
//! - Split "detach from parent" and "destroy record" into separately issued
//!   writes so either step can be retried on its own.
//! - Fan a completed session out to one board and its cards.
//!
//! # Invariants
//! - Detach writes are issued before destroy writes (issue order, not
//!   completion order).
//! - Board deletes never cascade; the board's lists and cards stay
//!   persisted.
//! - Card fan-out updates are independent; one failing card never blocks
//!   another or the board update.

use crate::model::session::SessionCompleted;
use crate::model::{BoardId, CardId, ListId};
use crate::outbox::{WriteQueue, WriteTicket};
use crate::repo::{BoardRepository, CardRepository, ListRepository, RepoError};
use crate::service::kanban_service::{KanbanError, KanbanResult};
use log::{debug, info, warn};

/// Writes issued by a list delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListDeletion {
    /// Array pull on the owning board, when one was named.
    pub detach: Option<WriteTicket>,
    /// Removal of the List record.
    pub destroy: WriteTicket,
}

/// Writes issued by a card delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardDeletion {
    pub detach: WriteTicket,
    pub destroy: WriteTicket,
}

/// Writes issued by one session-completion event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFanOut {
    pub board_write: WriteTicket,
    pub card_writes: Vec<(CardId, WriteTicket)>,
    /// Cards named by the event that could not be updated.
    pub skipped_cards: Vec<CardId>,
}

/// Routes deletes and fan-out updates across the three repositories.
pub struct CascadeCoordinator<'a> {
    boards: &'a mut BoardRepository,
    lists: &'a mut ListRepository,
    cards: &'a mut CardRepository,
    writes: &'a mut WriteQueue,
}

impl<'a> CascadeCoordinator<'a> {
    pub fn new(
        boards: &'a mut BoardRepository,
        lists: &'a mut ListRepository,
        cards: &'a mut CardRepository,
        writes: &'a mut WriteQueue,
    ) -> Self {
        Self {
            boards,
            lists,
            cards,
            writes,
        }
    }

    /// Deletes a list.
    ///
    /// Without `board_id` the list is treated as already detached and only
    /// its record is removed; this path also retries an interrupted
    /// board-scoped delete. With `board_id` the list is first pulled from the
    /// board's `listOrder`. Cards the list still owns are left persisted.
    pub fn delete_list(
        &mut self,
        list_id: ListId,
        board_id: Option<BoardId>,
    ) -> KanbanResult<ListDeletion> {
        if let Some(board_id) = board_id {
            return self.delete_list_via_board(board_id, list_id);
        }

        let orphaned_cards = self
            .lists
            .get(list_id)
            .map_or(0, |list| list.card_order.len());
        let destroy = self.lists.remove(list_id, self.writes);
        debug!(
            "event=list_delete module=cascade status=ok list_id={list_id} orphaned_cards={orphaned_cards}"
        );
        Ok(ListDeletion {
            detach: None,
            destroy,
        })
    }

    fn delete_list_via_board(
        &mut self,
        board_id: BoardId,
        list_id: ListId,
    ) -> KanbanResult<ListDeletion> {
        let board = self.boards.require(board_id)?;
        if board.list_position(list_id).is_none() {
            return Err(KanbanError::ListNotOnBoard { board_id, list_id });
        }
        if board.focused_list_id == Some(list_id) {
            return Err(KanbanError::FocusedListDelete { board_id, list_id });
        }

        let detach = self.boards.pull_list(board_id, list_id, self.writes)?;
        let deletion = self.delete_list(list_id, None)?;
        Ok(ListDeletion {
            detach: Some(detach),
            destroy: deletion.destroy,
        })
    }

    /// Deletes a card owned by `list_id`.
    ///
    /// The owning list must be supplied by the caller; there is no reverse
    /// lookup.
    pub fn delete_card(&mut self, list_id: ListId, card_id: CardId) -> KanbanResult<CardDeletion> {
        let list = self.lists.require(list_id)?;
        if list.card_position(card_id).is_none() {
            return Err(KanbanError::CardNotInList { list_id, card_id });
        }

        let detach = self.lists.pull_card(list_id, card_id, self.writes)?;
        let destroy = self.cards.remove(card_id, self.writes);
        debug!("event=card_delete module=cascade status=ok list_id={list_id} card_id={card_id}");
        Ok(CardDeletion { detach, destroy })
    }

    /// Removes the Board record only.
    pub fn delete_board(&mut self, board_id: BoardId) -> KanbanResult<WriteTicket> {
        let orphaned_lists = self.boards.require(board_id)?.list_order.len();
        let ticket = self.boards.remove(board_id, self.writes);
        info!(
            "event=board_delete module=cascade status=ok board_id={board_id} orphaned_lists={orphaned_lists}"
        );
        Ok(ticket)
    }

    /// Applies a completed session to its board and cards.
    ///
    /// The board must exist. Each distinct card is patched on its own; a
    /// card missing from the projection is logged and skipped.
    pub fn complete_session(&mut self, event: &SessionCompleted) -> KanbanResult<SessionFanOut> {
        event.validate()?;

        let board_write = self.boards.record_session(
            event.board_id,
            &event.session_id,
            event.duration_hours,
            self.writes,
        )?;

        let mut card_writes = Vec::new();
        let mut skipped_cards = Vec::new();
        for card_id in event.distinct_card_ids() {
            match self.cards.record_session(
                card_id,
                &event.session_id,
                event.duration_hours,
                self.writes,
            ) {
                Ok(ticket) => card_writes.push((card_id, ticket)),
                Err(err) => {
                    let code = match err {
                        RepoError::NotFound { .. } => "card_not_found",
                        _ => "card_patch_failed",
                    };
                    warn!(
                        "event=session_fan_out module=cascade status=error session_id={} card_id={} error_code={} error={}",
                        event.session_id, card_id, code, err
                    );
                    skipped_cards.push(card_id);
                }
            }
        }

        info!(
            "event=session_fan_out module=cascade status=ok board_id={} session_id={} cards={} skipped={}",
            event.board_id,
            event.session_id,
            card_writes.len(),
            skipped_cards.len()
        );
        Ok(SessionFanOut {
            board_write,
            card_writes,
            skipped_cards,
        })
    }
}
