//! Card repository operations.
//!
//! `set_actual_time` is the only way `spentTime.actual` can decrease; every
//! other path increments.

use super::{EntityRepository, RepoResult};
use crate::model::card::{fields, Card};
use crate::model::CardId;
use crate::outbox::{WriteQueue, WriteTicket};
use crate::store::UpdateOp;

pub type CardRepository = EntityRepository<Card>;

impl EntityRepository<Card> {
    pub fn rename(
        &mut self,
        card_id: CardId,
        title: &str,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(card_id, vec![UpdateOp::set(fields::TITLE, title)], writes)
    }

    pub fn set_content(
        &mut self,
        card_id: CardId,
        content: &str,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(card_id, vec![UpdateOp::set(fields::CONTENT, content)], writes)
    }

    pub fn set_estimated_time(
        &mut self,
        card_id: CardId,
        hours: f64,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(
            card_id,
            vec![UpdateOp::set(fields::SPENT_TIME_ESTIMATED, hours)],
            writes,
        )
    }

    /// Overwrites the actual hours.
    pub fn set_actual_time(
        &mut self,
        card_id: CardId,
        hours: f64,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(
            card_id,
            vec![UpdateOp::set(fields::SPENT_TIME_ACTUAL, hours)],
            writes,
        )
    }

    /// Adds `delta` hours to the actual time.
    pub fn add_actual_time(
        &mut self,
        card_id: CardId,
        delta: f64,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(
            card_id,
            vec![UpdateOp::inc(fields::SPENT_TIME_ACTUAL, delta)],
            writes,
        )
    }

    /// Links a completed session and adds its duration to the actual time.
    pub fn record_session(
        &mut self,
        card_id: CardId,
        session_id: &str,
        duration_hours: f64,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        self.patch(
            card_id,
            vec![
                UpdateOp::push(fields::SESSION_IDS, session_id),
                UpdateOp::inc(fields::SPENT_TIME_ACTUAL, duration_hours),
            ],
            writes,
        )
    }
}
