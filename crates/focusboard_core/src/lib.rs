//! Core domain logic for FocusBoard.
//! This crate keeps the board/list/card hierarchy consistent between the
//! in-memory projections and the embedded document store.

pub mod config;
pub mod db;
pub mod integrity;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod outbox;
pub mod projection;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use integrity::IntegrityViolation;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::board::{AggInfo, Board};
pub use model::card::{Card, SpentTime};
pub use model::list::List;
pub use model::move_record::MoveRecord;
pub use model::session::{SessionCompleted, SessionValidationError};
pub use model::{BoardId, CardId, Entity, ListId, SessionId};
pub use ordering::{reorder, OrderingError};
pub use outbox::{FlushReport, WriteClass, WriteReport, WriteTicket};
pub use projection::{KanbanView, Projection, TimeSummary};
pub use repo::{RepoError, RepoResult};
pub use service::cascade::{CardDeletion, CascadeCoordinator, ListDeletion, SessionFanOut};
pub use service::kanban_service::{
    CardMove, KanbanError, KanbanResult, KanbanService, LoadSummary, ReloadReport,
};
pub use store::{DocumentStore, Query, SqliteDocumentStore, StoreError, UpdateOp};
