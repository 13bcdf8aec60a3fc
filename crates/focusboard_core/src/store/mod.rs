//! Document store client contract and embedded implementation.
//!
//! # Responsibility
//! - Define the collection-oriented CRUD contract the repositories write
//!   through (`find`, `find_one`, `insert`, `update`, `remove`).
//! - Define update operators with set/increment/push/pull semantics.
//! - Provide a SQLite-backed implementation storing one JSON document per
//!   entity.
//!
//! # Invariants
//! - Every document is a JSON object with a string `id` field.
//! - `id` is immutable once inserted; operators may not target it.
//! - Increments are deltas applied to the stored value, never absolutes.

use crate::db::DbError;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod document;
mod sqlite;

pub use document::{apply_update, lookup};
pub use sqlite::SqliteDocumentStore;

/// One persisted record. Always a JSON object.
pub type Document = Value;

/// Field holding the document key.
pub const ID_FIELD: &str = "id";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by document store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Document body could not be encoded or decoded.
    Serialization(serde_json::Error),
    /// Insert rejected because the id already exists in the collection.
    DuplicateId { collection: String, id: String },
    /// Document is not an object or has no string `id`.
    InvalidDocument(String),
    /// Update operator cannot be applied to the addressed field.
    InvalidOperator { field: String, reason: &'static str },
    /// An update or remove addressed an id that has no document.
    NoMatchingDocument { collection: String, id: String },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "document serialization failed: {err}"),
            Self::DuplicateId { collection, id } => {
                write!(f, "document `{id}` already exists in `{collection}`")
            }
            Self::InvalidDocument(message) => write!(f, "invalid document: {message}"),
            Self::InvalidOperator { field, reason } => {
                write!(f, "cannot update field `{field}`: {reason}")
            }
            Self::NoMatchingDocument { collection, id } => {
                write!(f, "no document `{id}` in `{collection}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Document selector.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Every document in the collection.
    All,
    /// The document whose `id` equals the value.
    Id(String),
    /// Documents whose (possibly dotted) field equals the value.
    FieldEq { field: String, value: Value },
}

impl Query {
    /// Selects one document by id.
    pub fn id(id: impl ToString) -> Self {
        Self::Id(id.to_string())
    }

    /// Returns whether `doc` is selected by this query.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Id(id) => doc.get(ID_FIELD).and_then(Value::as_str) == Some(id.as_str()),
            Self::FieldEq { field, value } => lookup(doc, field) == Some(value),
        }
    }
}

/// Update operator. Fields are addressed with dotted paths
/// (`spentTime.actual`).
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    /// Overwrites the field.
    Set { field: String, value: Value },
    /// Adds `delta` to a numeric field; a missing field counts as zero.
    Inc { field: String, delta: f64 },
    /// Appends to an array field; a missing field becomes a new array.
    Push { field: String, value: Value },
    /// Removes every element equal to `value` from an array field.
    Pull { field: String, value: Value },
}

impl UpdateOp {
    pub fn set(field: &str, value: impl Into<Value>) -> Self {
        Self::Set {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn inc(field: &str, delta: f64) -> Self {
        Self::Inc {
            field: field.to_string(),
            delta,
        }
    }

    pub fn push(field: &str, value: impl Into<Value>) -> Self {
        Self::Push {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn pull(field: &str, value: impl Into<Value>) -> Self {
        Self::Pull {
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// Field path this operator targets.
    pub fn field(&self) -> &str {
        match self {
            Self::Set { field, .. }
            | Self::Inc { field, .. }
            | Self::Push { field, .. }
            | Self::Pull { field, .. } => field,
        }
    }

    /// Short operator name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Set { .. } => "set",
            Self::Inc { .. } => "inc",
            Self::Push { .. } => "push",
            Self::Pull { .. } => "pull",
        }
    }
}

/// Collection-oriented document store contract.
///
/// Implementations execute each call independently; there is no
/// multi-call transaction.
pub trait DocumentStore {
    /// Returns selected documents in insertion order. A non-empty `fields`
    /// keeps only those top-level fields (plus `id`).
    fn find(&self, collection: &str, query: &Query, fields: &[&str])
        -> StoreResult<Vec<Document>>;
    /// Returns the first selected document, if any.
    fn find_one(&self, collection: &str, query: &Query) -> StoreResult<Option<Document>>;
    /// Inserts one document. Rejects duplicate ids.
    fn insert(&self, collection: &str, doc: &Document) -> StoreResult<()>;
    /// Applies operators to every selected document. Returns matched count.
    fn update(&self, collection: &str, query: &Query, ops: &[UpdateOp]) -> StoreResult<usize>;
    /// Removes every selected document. Returns removed count.
    fn remove(&self, collection: &str, query: &Query) -> StoreResult<usize>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn find(
        &self,
        collection: &str,
        query: &Query,
        fields: &[&str],
    ) -> StoreResult<Vec<Document>> {
        (**self).find(collection, query, fields)
    }

    fn find_one(&self, collection: &str, query: &Query) -> StoreResult<Option<Document>> {
        (**self).find_one(collection, query)
    }

    fn insert(&self, collection: &str, doc: &Document) -> StoreResult<()> {
        (**self).insert(collection, doc)
    }

    fn update(&self, collection: &str, query: &Query, ops: &[UpdateOp]) -> StoreResult<usize> {
        (**self).update(collection, query, ops)
    }

    fn remove(&self, collection: &str, query: &Query) -> StoreResult<usize> {
        (**self).remove(collection, query)
    }
}

/// Extracts the `id` of a document.
pub fn document_id(doc: &Document) -> StoreResult<&str> {
    if !doc.is_object() {
        return Err(StoreError::InvalidDocument(
            "document must be a JSON object".to_string(),
        ));
    }
    doc.get(ID_FIELD)
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::InvalidDocument("document has no string `id`".to_string()))
}
