//! Kanban use-case service.
//!
//! # Responsibility
//! - Own the three repositories, the write queue and the store handle.
//! - Provide create, rename, move and query entry points for boards, lists
//!   and cards.
//! - Hand cascade requests to `CascadeCoordinator`.
//!
//! # Invariants
//! - Every request is validated before the first projection mutation, so a
//!   rejected request changes nothing.
//! - Mutations return once their writes are issued; `flush` completes them.
//! - Child records are inserted before the parent references them.

use crate::integrity::{check_integrity, IntegrityViolation};
use crate::model::board::{AggInfo, Board, DEFAULT_FOCUSED_LIST_INDEX, DEFAULT_LIST_TITLES};
use crate::model::card::Card;
use crate::model::list::List;
use crate::model::move_record::MoveRecord;
use crate::model::session::{SessionCompleted, SessionValidationError};
use crate::model::{BoardId, CardId, Entity, ListId};
use crate::ordering::{reorder, transfer, OrderingError};
use crate::outbox::{FlushReport, StoreWrite, WriteClass, WriteQueue, WriteTicket};
use crate::projection::{KanbanView, TimeSummary};
use crate::repo::{BoardRepository, CardRepository, ListRepository, RepoError};
use crate::search::CardFilter;
use crate::service::cascade::{CardDeletion, CascadeCoordinator, ListDeletion, SessionFanOut};
use crate::store::DocumentStore;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from kanban service operations.
#[derive(Debug)]
pub enum KanbanError {
    /// Name or title is blank after trim.
    InvalidName,
    /// Hour value is negative or not finite.
    InvalidHours(f64),
    /// Session event failed validation.
    InvalidSession(SessionValidationError),
    /// Search pattern is not a valid regex.
    InvalidPattern(regex::Error),
    /// Index or duplicate error from the ordering engine.
    Ordering(OrderingError),
    /// List id is not in the board's `listOrder`.
    ListNotOnBoard { board_id: BoardId, list_id: ListId },
    /// List id is already owned by a board.
    ListAlreadyOnBoard { board_id: BoardId, list_id: ListId },
    /// Card id is not in the list's `cardOrder`.
    CardNotInList { list_id: ListId, card_id: CardId },
    /// Card id is already owned by a list.
    CardAlreadyInList { list_id: ListId, card_id: CardId },
    /// The board's focused list cannot be deleted.
    FocusedListDelete { board_id: BoardId, list_id: ListId },
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for KanbanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "name must not be blank"),
            Self::InvalidHours(value) => {
                write!(f, "hours must be finite and not negative, got {value}")
            }
            Self::InvalidSession(err) => write!(f, "invalid session: {err}"),
            Self::InvalidPattern(err) => write!(f, "invalid search pattern: {err}"),
            Self::Ordering(err) => write!(f, "{err}"),
            Self::ListNotOnBoard { board_id, list_id } => {
                write!(f, "list {list_id} is not on board {board_id}")
            }
            Self::ListAlreadyOnBoard { board_id, list_id } => {
                write!(f, "list {list_id} is already on board {board_id}")
            }
            Self::CardNotInList { list_id, card_id } => {
                write!(f, "card {card_id} is not in list {list_id}")
            }
            Self::CardAlreadyInList { list_id, card_id } => {
                write!(f, "card {card_id} already belongs to list {list_id}")
            }
            Self::FocusedListDelete { board_id, list_id } => {
                write!(f, "list {list_id} is the focused list of board {board_id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for KanbanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidSession(err) => Some(err),
            Self::InvalidPattern(err) => Some(err),
            Self::Ordering(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for KanbanError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<OrderingError> for KanbanError {
    fn from(value: OrderingError) -> Self {
        Self::Ordering(value)
    }
}

impl From<SessionValidationError> for KanbanError {
    fn from(value: SessionValidationError) -> Self {
        Self::InvalidSession(value)
    }
}

pub type KanbanResult<T> = Result<T, KanbanError>;

/// Record counts from a full projection load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    pub boards: usize,
    pub lists: usize,
    pub cards: usize,
}

/// Outcome of `reload`: the flush that preceded it and the fresh counts.
#[derive(Debug)]
pub struct ReloadReport {
    pub flush: FlushReport,
    pub loaded: LoadSummary,
}

/// Writes issued by one card move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardMove {
    pub card_id: CardId,
    pub source_write: WriteTicket,
    /// Present when the card changed lists.
    pub destination_write: Option<WriteTicket>,
    /// Present when the card changed lists and the audit record was issued.
    pub audit_write: Option<WriteTicket>,
}

/// Kanban service facade over one document store.
pub struct KanbanService<S: DocumentStore> {
    store: S,
    boards: BoardRepository,
    lists: ListRepository,
    cards: CardRepository,
    writes: WriteQueue,
}

impl<S: DocumentStore> KanbanService<S> {
    /// Creates a service with empty projections.
    pub fn new(store: S) -> Self {
        Self {
            store,
            boards: BoardRepository::new(),
            lists: ListRepository::new(),
            cards: CardRepository::new(),
            writes: WriteQueue::new(),
        }
    }

    /// Creates a service and loads every projection from the store.
    pub fn open(store: S) -> KanbanResult<Self> {
        let mut service = Self::new(store);
        service.load_all()?;
        Ok(service)
    }

    /// Replaces every projection with store contents.
    ///
    /// Writes still pending are not executed; use `reload` to flush first.
    /// All three collections are decoded before any projection is replaced,
    /// so a failed load leaves every projection as it was.
    pub fn load_all(&mut self) -> KanbanResult<LoadSummary> {
        let lists = self.lists.fetch_all(&self.store)?;
        let cards = self.cards.fetch_all(&self.store)?;
        let boards = self.boards.fetch_all(&self.store)?;
        Ok(LoadSummary {
            lists: self.lists.replace_projection(lists),
            cards: self.cards.replace_projection(cards),
            boards: self.boards.replace_projection(boards),
        })
    }

    /// Flushes pending writes, then reloads projections so they match the
    /// store again.
    pub fn reload(&mut self) -> KanbanResult<ReloadReport> {
        let flush = self.flush();
        let loaded = self.load_all()?;
        Ok(ReloadReport { flush, loaded })
    }

    /// Executes every pending write in issue order.
    pub fn flush(&mut self) -> FlushReport {
        self.writes.flush(&self.store)
    }

    /// Number of issued writes not yet flushed.
    pub fn pending_writes(&self) -> usize {
        self.writes.pending()
    }

    /// Read-only projections for view consumers.
    pub fn view(&self) -> KanbanView<'_> {
        KanbanView {
            boards: self.boards.projection(),
            lists: self.lists.projection(),
            cards: self.cards.projection(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Coordinator for deletes and session fan-out.
    pub fn cascade(&mut self) -> CascadeCoordinator<'_> {
        CascadeCoordinator::new(
            &mut self.boards,
            &mut self.lists,
            &mut self.cards,
            &mut self.writes,
        )
    }

    /// Creates a board with the default `TODO`, `In Progress` and `Done`
    /// lists, focused on `In Progress`.
    pub fn create_board(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> KanbanResult<Board> {
        let name = normalize_name(name.into())?;
        let mut board = Board::new(name, description.into().trim());

        for title in DEFAULT_LIST_TITLES {
            let list = List::new(title);
            board.list_order.push(list.id);
            self.lists.create(list, &mut self.writes)?;
        }
        board.focused_list_id = board.list_order.get(DEFAULT_FOCUSED_LIST_INDEX).copied();

        self.boards.create(board.clone(), &mut self.writes)?;
        info!(
            "event=board_create module=service status=ok board_id={} lists={}",
            board.id,
            board.list_order.len()
        );
        Ok(board)
    }

    pub fn rename_board(&mut self, board_id: BoardId, name: &str) -> KanbanResult<WriteTicket> {
        let name = normalize_name(name.to_string())?;
        Ok(self.boards.rename(board_id, &name, &mut self.writes)?)
    }

    pub fn edit_board(
        &mut self,
        board_id: BoardId,
        name: &str,
        description: &str,
    ) -> KanbanResult<WriteTicket> {
        let name = normalize_name(name.to_string())?;
        Ok(self
            .boards
            .edit(board_id, &name, description.trim(), &mut self.writes)?)
    }

    /// Focuses a list; it must be on the board.
    pub fn set_focused_list(
        &mut self,
        board_id: BoardId,
        list_id: ListId,
    ) -> KanbanResult<WriteTicket> {
        let board = self.boards.require(board_id)?;
        if board.list_position(list_id).is_none() {
            return Err(KanbanError::ListNotOnBoard { board_id, list_id });
        }
        Ok(self
            .boards
            .set_focused_list(board_id, list_id, &mut self.writes)?)
    }

    pub fn update_agg_info(
        &mut self,
        board_id: BoardId,
        agg_info: &AggInfo,
    ) -> KanbanResult<WriteTicket> {
        Ok(self
            .boards
            .set_agg_info(board_id, agg_info, &mut self.writes)?)
    }

    /// Moves a list within its board.
    pub fn move_list(
        &mut self,
        board_id: BoardId,
        from_index: usize,
        to_index: usize,
    ) -> KanbanResult<WriteTicket> {
        let board = self.boards.require(board_id)?;
        let list_order = reorder(&board.list_order, from_index, to_index)?;
        let ticket = self
            .boards
            .set_list_order(board_id, &list_order, &mut self.writes)?;
        debug!(
            "event=list_move module=service status=ok board_id={board_id} from={from_index} to={to_index}"
        );
        Ok(ticket)
    }

    /// Creates a list and appends it to the board.
    pub fn add_list(&mut self, board_id: BoardId, title: impl Into<String>) -> KanbanResult<List> {
        let title = normalize_name(title.into())?;
        self.boards.require(board_id)?;

        let list = List::new(title);
        self.lists.create(list.clone(), &mut self.writes)?;
        self.boards.push_list(board_id, list.id, &mut self.writes)?;
        Ok(list)
    }

    /// Appends an existing, unowned list to the board.
    pub fn attach_list(&mut self, board_id: BoardId, list_id: ListId) -> KanbanResult<WriteTicket> {
        self.boards.require(board_id)?;
        self.lists.require(list_id)?;
        if let Some(owner) = self.view().owning_board(list_id) {
            return Err(KanbanError::ListAlreadyOnBoard {
                board_id: owner.id,
                list_id,
            });
        }
        Ok(self.boards.push_list(board_id, list_id, &mut self.writes)?)
    }

    pub fn rename_list(&mut self, list_id: ListId, title: &str) -> KanbanResult<WriteTicket> {
        let title = normalize_name(title.to_string())?;
        Ok(self.lists.rename(list_id, &title, &mut self.writes)?)
    }

    /// Moves a card within one list or between two lists.
    ///
    /// Across lists this issues two independent order writes followed by a
    /// fire-and-forget audit record.
    pub fn move_card(
        &mut self,
        from_list_id: ListId,
        to_list_id: ListId,
        from_index: usize,
        to_index: usize,
    ) -> KanbanResult<CardMove> {
        let source = self.lists.require(from_list_id)?;

        if from_list_id == to_list_id {
            let card_order = reorder(&source.card_order, from_index, to_index)?;
            let card_id = source.card_order[from_index];
            let source_write =
                self.lists
                    .set_card_order(from_list_id, &card_order, &mut self.writes)?;
            return Ok(CardMove {
                card_id,
                source_write,
                destination_write: None,
                audit_write: None,
            });
        }

        let destination = self.lists.require(to_list_id)?;
        let moved = transfer(
            &source.card_order,
            &destination.card_order,
            from_index,
            to_index,
        )?;

        let source_write =
            self.lists
                .set_card_order(from_list_id, &moved.source, &mut self.writes)?;
        let destination_write =
            self.lists
                .set_card_order(to_list_id, &moved.destination, &mut self.writes)?;
        let audit_write = self.issue_move_record(MoveRecord::now(
            from_list_id,
            to_list_id,
            moved.moved,
        ));

        debug!(
            "event=card_move module=service status=ok card_id={} from_list={} to_list={}",
            moved.moved, from_list_id, to_list_id
        );
        Ok(CardMove {
            card_id: moved.moved,
            source_write,
            destination_write: Some(destination_write),
            audit_write,
        })
    }

    /// Creates a card and appends it to the list.
    pub fn add_card(
        &mut self,
        list_id: ListId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> KanbanResult<Card> {
        let title = normalize_name(title.into())?;
        self.lists.require(list_id)?;

        let card = Card::new(title, content);
        self.cards.create(card.clone(), &mut self.writes)?;
        self.lists.push_card(list_id, card.id, &mut self.writes)?;
        Ok(card)
    }

    /// Appends an existing, unowned card to the list.
    pub fn attach_card(&mut self, list_id: ListId, card_id: CardId) -> KanbanResult<WriteTicket> {
        self.lists.require(list_id)?;
        self.cards.require(card_id)?;
        if let Some(owner) = self.view().owning_list(card_id) {
            return Err(KanbanError::CardAlreadyInList {
                list_id: owner.id,
                card_id,
            });
        }
        Ok(self.lists.push_card(list_id, card_id, &mut self.writes)?)
    }

    pub fn rename_card(&mut self, card_id: CardId, title: &str) -> KanbanResult<WriteTicket> {
        let title = normalize_name(title.to_string())?;
        Ok(self.cards.rename(card_id, &title, &mut self.writes)?)
    }

    pub fn set_card_content(
        &mut self,
        card_id: CardId,
        content: &str,
    ) -> KanbanResult<WriteTicket> {
        Ok(self.cards.set_content(card_id, content, &mut self.writes)?)
    }

    pub fn set_estimated_time(&mut self, card_id: CardId, hours: f64) -> KanbanResult<WriteTicket> {
        let hours = validate_hours(hours)?;
        Ok(self
            .cards
            .set_estimated_time(card_id, hours, &mut self.writes)?)
    }

    /// Overwrites the actual hours of a card. This is the explicit edit path
    /// and may lower the value.
    pub fn set_actual_time(&mut self, card_id: CardId, hours: f64) -> KanbanResult<WriteTicket> {
        let hours = validate_hours(hours)?;
        Ok(self.cards.set_actual_time(card_id, hours, &mut self.writes)?)
    }

    /// Adds hours to the actual time of a card.
    pub fn add_actual_time(&mut self, card_id: CardId, delta: f64) -> KanbanResult<WriteTicket> {
        let delta = validate_hours(delta)?;
        Ok(self.cards.add_actual_time(card_id, delta, &mut self.writes)?)
    }

    /// See `CascadeCoordinator::delete_list`.
    pub fn delete_list(
        &mut self,
        list_id: ListId,
        board_id: Option<BoardId>,
    ) -> KanbanResult<ListDeletion> {
        self.cascade().delete_list(list_id, board_id)
    }

    /// See `CascadeCoordinator::delete_card`.
    pub fn delete_card(&mut self, list_id: ListId, card_id: CardId) -> KanbanResult<CardDeletion> {
        self.cascade().delete_card(list_id, card_id)
    }

    /// See `CascadeCoordinator::delete_board`.
    pub fn delete_board(&mut self, board_id: BoardId) -> KanbanResult<WriteTicket> {
        self.cascade().delete_board(board_id)
    }

    /// See `CascadeCoordinator::complete_session`.
    pub fn complete_session(&mut self, event: &SessionCompleted) -> KanbanResult<SessionFanOut> {
        self.cascade().complete_session(event)
    }

    /// Cards of a list whose title or content matches `pattern`, in list
    /// order.
    pub fn search_cards(&self, list_id: ListId, pattern: &str) -> KanbanResult<Vec<&Card>> {
        self.lists.require(list_id)?;
        let filter = CardFilter::new(pattern).map_err(KanbanError::InvalidPattern)?;
        Ok(filter.apply(self.view().list_cards(list_id)))
    }

    /// Estimated and actual hours summed over a list's cards.
    pub fn list_time_summary(&self, list_id: ListId) -> KanbanResult<TimeSummary> {
        self.lists.require(list_id)?;
        Ok(self.view().list_time_summary(list_id))
    }

    /// Invariant violations currently visible in the projections.
    pub fn check_integrity(&self) -> Vec<IntegrityViolation> {
        check_integrity(&self.view())
    }

    fn issue_move_record(&mut self, record: MoveRecord) -> Option<WriteTicket> {
        match serde_json::to_value(&record) {
            Ok(doc) => Some(self.writes.issue(
                MoveRecord::COLLECTION,
                WriteClass::Audit,
                StoreWrite::Insert(doc),
            )),
            Err(err) => {
                warn!(
                    "event=move_audit module=service status=error card_id={} error={}",
                    record.card_id, err
                );
                None
            }
        }
    }
}

fn normalize_name(value: String) -> KanbanResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(KanbanError::InvalidName);
    }
    Ok(trimmed.to_string())
}

fn validate_hours(value: f64) -> KanbanResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(KanbanError::InvalidHours(value));
    }
    Ok(value)
}
