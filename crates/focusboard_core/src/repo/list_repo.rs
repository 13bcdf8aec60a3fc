//! List repository operations.

use super::{id_array, id_value, EntityRepository, RepoResult};
use crate::model::list::{fields, List};
use crate::model::{CardId, ListId};
use crate::outbox::{WriteQueue, WriteTicket};
use crate::store::UpdateOp;

pub type ListRepository = EntityRepository<List>;

impl EntityRepository<List> {
    /// Persists a new card order as one `set`.
    pub fn set_card_order(
        &mut self,
        list_id: ListId,
        card_order: &[CardId],
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(
            list_id,
            vec![UpdateOp::set(fields::CARD_ORDER, id_array(card_order))],
            writes,
        )
    }

    pub fn push_card(
        &mut self,
        list_id: ListId,
        card_id: CardId,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(
            list_id,
            vec![UpdateOp::push(fields::CARD_ORDER, id_value(card_id))],
            writes,
        )
    }

    /// Detaches a card id (array pull).
    pub fn pull_card(
        &mut self,
        list_id: ListId,
        card_id: CardId,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(
            list_id,
            vec![UpdateOp::pull(fields::CARD_ORDER, id_value(card_id))],
            writes,
        )
    }

    pub fn rename(
        &mut self,
        list_id: ListId,
        title: &str,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(list_id, vec![UpdateOp::set(fields::TITLE, title)], writes)
    }
}
