//! Board repository operations.

use super::{id_array, id_value, EntityRepository, RepoResult};
use crate::model::board::{fields, AggInfo, Board};
use crate::model::{BoardId, ListId};
use crate::outbox::{WriteQueue, WriteTicket};
use crate::store::UpdateOp;

pub type BoardRepository = EntityRepository<Board>;

impl EntityRepository<Board> {
    /// Persists a new list order as one `set`.
    pub fn set_list_order(
        &mut self,
        board_id: BoardId,
        list_order: &[ListId],
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(
            board_id,
            vec![UpdateOp::set(fields::LIST_ORDER, id_array(list_order))],
            writes,
        )
    }

    /// Appends a list id.
    pub fn push_list(
        &mut self,
        board_id: BoardId,
        list_id: ListId,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(
            board_id,
            vec![UpdateOp::push(fields::LIST_ORDER, id_value(list_id))],
            writes,
        )
    }

    /// Detaches a list id (array pull).
    pub fn pull_list(
        &mut self,
        board_id: BoardId,
        list_id: ListId,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(
            board_id,
            vec![UpdateOp::pull(fields::LIST_ORDER, id_value(list_id))],
            writes,
        )
    }

    pub fn rename(
        &mut self,
        board_id: BoardId,
        name: &str,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(board_id, vec![UpdateOp::set(fields::NAME, name)], writes)
    }

    pub fn edit(
        &mut self,
        board_id: BoardId,
        name: &str,
        description: &str,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(
            board_id,
            vec![
                UpdateOp::set(fields::NAME, name),
                UpdateOp::set(fields::DESCRIPTION, description),
            ],
            writes,
        )
    }

    pub fn set_focused_list(
        &mut self,
        board_id: BoardId,
        list_id: ListId,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(
            board_id,
            vec![UpdateOp::set(fields::FOCUSED_LIST_ID, id_value(list_id))],
            writes,
        )
    }

    /// Links a completed session and adds its duration to `spentHours`.
    pub fn record_session(
        &mut self,
        board_id: BoardId,
        session_id: &str,
        duration_hours: f64,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(
            board_id,
            vec![
                UpdateOp::push(fields::RELATED_SESSION_IDS, session_id),
                UpdateOp::inc(fields::SPENT_HOURS, duration_hours),
            ],
            writes,
        )
    }

    pub fn set_agg_info(
        &mut self,
        board_id: BoardId,
        agg_info: &AggInfo,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        let value = serde_json::to_value(agg_info)?;
        self.patch(board_id, vec![UpdateOp::set(fields::AGG_INFO, value)], writes)
    }
}
