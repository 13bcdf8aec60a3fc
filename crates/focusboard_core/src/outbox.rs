//! Write-behind queue between projections and the document store.
//!
//! # Responsibility
//! - Record every store write in the order it was issued.
//! - Execute pending writes on `flush` and report each outcome as a value.
//!
//! # Invariants
//! - Writes execute in issue order; a failure never stops later writes.
//! - Failed writes are logged and reported, never retried or rolled back.
//! - Audit writes are fire-and-forget: their failures are reported but never
//!   surfaced as mutation errors.

use crate::store::{Document, DocumentStore, Query, StoreError, UpdateOp};
use log::{info, warn};
use std::collections::VecDeque;
use std::time::Instant;

/// Handle identifying one issued write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WriteTicket(u64);

impl WriteTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// Store operation carried by a pending write.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreWrite {
    Insert(Document),
    Update { id: String, ops: Vec<UpdateOp> },
    Remove { id: String },
}

impl StoreWrite {
    fn name(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::Update { .. } => "update",
            Self::Remove { .. } => "remove",
        }
    }
}

/// Whether a write mirrors entity state or appends to an audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteClass {
    Entity,
    Audit,
}

#[derive(Debug, Clone)]
struct PendingWrite {
    ticket: WriteTicket,
    collection: &'static str,
    class: WriteClass,
    write: StoreWrite,
}

/// Outcome of one executed write.
#[derive(Debug)]
pub struct WriteReport {
    pub ticket: WriteTicket,
    pub collection: &'static str,
    pub class: WriteClass,
    pub write: StoreWrite,
    pub result: Result<(), StoreError>,
}

impl WriteReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of one `flush`, in issue order.
#[derive(Debug, Default)]
pub struct FlushReport {
    pub writes: Vec<WriteReport>,
}

impl FlushReport {
    pub fn is_clean(&self) -> bool {
        self.writes.iter().all(WriteReport::is_ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = &WriteReport> {
        self.writes.iter().filter(|report| !report.is_ok())
    }

    /// Entity write failures; these leave the projection ahead of the store.
    pub fn entity_failures(&self) -> impl Iterator<Item = &WriteReport> {
        self.failures()
            .filter(|report| report.class == WriteClass::Entity)
    }

    pub fn get(&self, ticket: WriteTicket) -> Option<&WriteReport> {
        self.writes.iter().find(|report| report.ticket == ticket)
    }
}

/// FIFO of issued, not yet executed store writes.
#[derive(Debug, Default)]
pub struct WriteQueue {
    next_sequence: u64,
    pending: VecDeque<PendingWrite>,
}

impl WriteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of issued writes not yet executed.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Issues one write and returns immediately.
    pub fn issue(
        &mut self,
        collection: &'static str,
        class: WriteClass,
        write: StoreWrite,
    ) -> WriteTicket {
        let ticket = WriteTicket(self.next_sequence);
        self.next_sequence += 1;
        self.pending.push_back(PendingWrite {
            ticket,
            collection,
            class,
            write,
        });
        ticket
    }

    /// Executes every pending write against `store`, oldest first.
    pub fn flush(&mut self, store: &dyn DocumentStore) -> FlushReport {
        let started_at = Instant::now();
        let mut report = FlushReport::default();
        while let Some(pending) = self.pending.pop_front() {
            let result = execute(store, pending.collection, &pending.write);
            if let Err(err) = &result {
                warn!(
                    "event=store_write module=outbox status=error ticket={} collection={} op={} class={:?} error={}",
                    pending.ticket.0,
                    pending.collection,
                    pending.write.name(),
                    pending.class,
                    err
                );
            }
            report.writes.push(WriteReport {
                ticket: pending.ticket,
                collection: pending.collection,
                class: pending.class,
                write: pending.write,
                result,
            });
        }

        if !report.writes.is_empty() {
            info!(
                "event=flush module=outbox status={} writes={} failures={} duration_ms={}",
                if report.is_clean() { "ok" } else { "partial" },
                report.writes.len(),
                report.failures().count(),
                started_at.elapsed().as_millis()
            );
        }
        report
    }
}

fn execute(
    store: &dyn DocumentStore,
    collection: &str,
    write: &StoreWrite,
) -> Result<(), StoreError> {
    match write {
        StoreWrite::Insert(doc) => store.insert(collection, doc),
        StoreWrite::Update { id, ops } => {
            let matched = store.update(collection, &Query::Id(id.clone()), ops)?;
            require_match(matched, collection, id)
        }
        StoreWrite::Remove { id } => {
            let removed = store.remove(collection, &Query::Id(id.clone()))?;
            require_match(removed, collection, id)
        }
    }
}

fn require_match(count: usize, collection: &str, id: &str) -> Result<(), StoreError> {
    if count == 0 {
        return Err(StoreError::NoMatchingDocument {
            collection: collection.to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{StoreWrite, WriteClass, WriteQueue};
    use crate::db::open_db_in_memory;
    use crate::store::{DocumentStore, Query, SqliteDocumentStore, StoreError, UpdateOp};
    use serde_json::json;

    #[test]
    fn flush_runs_in_issue_order_and_continues_after_failure() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();
        let mut queue = WriteQueue::new();

        let insert = queue.issue(
            "lists",
            WriteClass::Entity,
            StoreWrite::Insert(json!({"id": "l1", "title": "a", "cardOrder": []})),
        );
        let missing = queue.issue(
            "lists",
            WriteClass::Entity,
            StoreWrite::Update {
                id: "nope".to_string(),
                ops: vec![UpdateOp::set("title", "x")],
            },
        );
        let rename = queue.issue(
            "lists",
            WriteClass::Entity,
            StoreWrite::Update {
                id: "l1".to_string(),
                ops: vec![UpdateOp::set("title", "b")],
            },
        );
        assert_eq!(queue.pending(), 3);
        assert!(insert < missing && missing < rename);

        let report = queue.flush(&store);
        assert_eq!(queue.pending(), 0);
        assert_eq!(report.writes.len(), 3);
        assert!(report.get(insert).unwrap().is_ok());
        assert!(matches!(
            report.get(missing).unwrap().result,
            Err(StoreError::NoMatchingDocument { .. })
        ));
        assert!(report.get(rename).unwrap().is_ok());
        assert_eq!(report.entity_failures().count(), 1);

        let doc = store.find_one("lists", &Query::id("l1")).unwrap().unwrap();
        assert_eq!(doc["title"], json!("b"));
    }

    #[test]
    fn empty_flush_reports_nothing() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();
        let report = WriteQueue::new().flush(&store);
        assert!(report.is_clean());
        assert!(report.writes.is_empty());
    }
}
