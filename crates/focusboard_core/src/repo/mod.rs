//! Entity repositories over the document store.
//!
//! # Responsibility
//! - Own one projection per entity kind and keep it in step with issued
//!   store writes.
//! - Translate domain operations into update operators.
//!
//! # Invariants
//! - The projection is updated before the matching write is issued.
//! - Increments travel to the store as deltas, never recomputed absolutes.
//! - Repositories never call each other; cross-entity rules live in
//!   `service::cascade`.

use crate::model::Entity;
use crate::outbox::{StoreWrite, WriteClass, WriteQueue, WriteTicket};
use crate::projection::Projection;
use crate::store::{apply_update, DocumentStore, Query, StoreError, UpdateOp};
use log::{error, info};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

pub mod board_repo;
pub mod card_repo;
pub mod list_repo;

pub use board_repo::BoardRepository;
pub use card_repo::CardRepository;
pub use list_repo::ListRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// No projected entity of `kind` with this id.
    NotFound { kind: &'static str, id: Uuid },
    /// A patch carried no operators.
    EmptyPatch { kind: &'static str, id: Uuid },
    /// Persisted document cannot be decoded into the entity shape.
    InvalidData(String),
    /// Store or operator failure.
    Store(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::EmptyPatch { kind, id } => write!(f, "empty patch for {kind} {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Store(StoreError::Serialization(value))
    }
}

/// Projection plus write-issuing operations for one entity kind.
#[derive(Debug)]
pub struct EntityRepository<E: Entity> {
    projection: Projection<E>,
}

impl<E: Entity> Default for EntityRepository<E> {
    fn default() -> Self {
        Self {
            projection: Projection::default(),
        }
    }
}

impl<E: Entity> EntityRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only projection for view consumers.
    pub fn projection(&self) -> &Projection<E> {
        &self.projection
    }

    pub fn get(&self, id: Uuid) -> Option<&E> {
        self.projection.get(id)
    }

    /// Returns the projected entity or `NotFound`.
    pub fn require(&self, id: Uuid) -> RepoResult<&E> {
        self.projection.get(id).ok_or(RepoError::NotFound {
            kind: E::KIND,
            id,
        })
    }

    /// Replaces the projection with every record in the store.
    ///
    /// On error the previous projection is kept.
    pub fn load_all(&mut self, store: &dyn DocumentStore) -> RepoResult<usize> {
        let loaded = self.fetch_all(store)?;
        Ok(self.replace_projection(loaded))
    }

    /// Reads and decodes every record without touching the projection.
    pub fn fetch_all(&self, store: &dyn DocumentStore) -> RepoResult<Vec<E>> {
        let started_at = Instant::now();
        match decode_collection::<E>(store) {
            Ok(entities) => {
                info!(
                    "event=projection_load module=repo status=ok kind={} records={} duration_ms={}",
                    E::KIND,
                    entities.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(entities)
            }
            Err(err) => {
                error!(
                    "event=projection_load module=repo status=error kind={} duration_ms={} error={}",
                    E::KIND,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Swaps in entities read by `fetch_all`. Returns the record count.
    pub fn replace_projection(&mut self, entities: Vec<E>) -> usize {
        let count = entities.len();
        self.projection.replace_all(entities);
        count
    }

    /// Projects a new entity and issues its full-record insert.
    ///
    /// A store rejection (for example a duplicate id) only shows up in the
    /// flush report; the projection keeps the entity.
    pub fn create(&mut self, entity: E, writes: &mut WriteQueue) -> RepoResult<WriteTicket> {
        let doc = serde_json::to_value(&entity)?;
        self.projection.upsert(entity);
        Ok(writes.issue(E::COLLECTION, WriteClass::Entity, StoreWrite::Insert(doc)))
    }

    /// Applies `ops` to the projected entity, then issues them as one update.
    ///
    /// Operators are evaluated on a scratch copy first, so an invalid
    /// operator leaves the projection untouched and issues nothing.
    pub fn patch(
        &mut self,
        id: Uuid,
        ops: Vec<UpdateOp>,
        writes: &mut WriteQueue,
    ) -> RepoResult<WriteTicket> {
        if ops.is_empty() {
            return Err(RepoError::EmptyPatch { kind: E::KIND, id });
        }

        let mut doc = serde_json::to_value(self.require(id)?)?;
        apply_update(&mut doc, &ops)?;
        let updated: E = serde_json::from_value(doc)?;
        self.projection.upsert(updated);

        Ok(writes.issue(
            E::COLLECTION,
            WriteClass::Entity,
            StoreWrite::Update {
                id: id.to_string(),
                ops,
            },
        ))
    }

    /// Drops the entity from the projection and issues the record removal.
    ///
    /// The removal is issued even when the id is no longer projected, so an
    /// interrupted cascade can be retried.
    pub fn remove(&mut self, id: Uuid, writes: &mut WriteQueue) -> WriteTicket {
        self.projection.remove(id);
        writes.issue(
            E::COLLECTION,
            WriteClass::Entity,
            StoreWrite::Remove { id: id.to_string() },
        )
    }
}

fn decode_collection<E: Entity>(store: &dyn DocumentStore) -> RepoResult<Vec<E>> {
    store
        .find(E::COLLECTION, &Query::All, &[])?
        .into_iter()
        .map(|doc| {
            serde_json::from_value::<E>(doc).map_err(|err| {
                RepoError::InvalidData(format!("{} document: {err}", E::COLLECTION))
            })
        })
        .collect()
}

/// Encodes ids as a JSON string array for order fields.
pub(crate) fn id_array(ids: &[Uuid]) -> Value {
    Value::Array(ids.iter().map(|id| Value::String(id.to_string())).collect())
}

/// Encodes one id as a JSON string.
pub(crate) fn id_value(id: Uuid) -> Value {
    Value::String(id.to_string())
}
