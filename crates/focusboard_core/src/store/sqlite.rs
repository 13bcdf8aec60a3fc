//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist one JSON document per `(collection, id)` in the `documents`
//!   table.
//! - Evaluate update operators inside an immediate transaction so a
//!   read-modify-write never interleaves with another writer.
//!
//! # Invariants
//! - Connection must be migrated before construction (`try_new` checks).
//! - `find` returns documents in insertion order (`created_at, rowid`).

use super::document::apply_update;
use super::{document_id, Document, DocumentStore, Query, StoreError, StoreResult, UpdateOp};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Transaction, TransactionBehavior};
use serde_json::{Map, Value};

/// Document store over a migrated SQLite connection.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Creates a store from a connection returned by `open_db*`.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let latest = latest_version();
        let actual = current_user_version(conn)?;
        if actual != latest {
            return Err(StoreError::Db(DbError::UnsupportedSchemaVersion {
                db_version: actual,
                latest_supported: latest,
            }));
        }
        Ok(Self { conn })
    }

    fn select(
        &self,
        conn: &Connection,
        collection: &str,
        query: &Query,
    ) -> StoreResult<Vec<Document>> {
        let mut docs = Vec::new();
        if let Query::Id(id) = query {
            let body: Option<String> = conn
                .query_row(
                    "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2;",
                    params![collection, id],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(body) = body {
                docs.push(serde_json::from_str(&body)?);
            }
            return Ok(docs);
        }

        let mut stmt = conn.prepare(
            "SELECT body
             FROM documents
             WHERE collection = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([collection])?;
        while let Some(row) = rows.next()? {
            let body: String = row.get(0)?;
            let doc: Document = serde_json::from_str(&body)?;
            if query.matches(&doc) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn find(
        &self,
        collection: &str,
        query: &Query,
        fields: &[&str],
    ) -> StoreResult<Vec<Document>> {
        let docs = self.select(self.conn, collection, query)?;
        if fields.is_empty() {
            return Ok(docs);
        }
        Ok(docs
            .into_iter()
            .map(|doc| select_fields(doc, fields))
            .collect())
    }

    fn find_one(&self, collection: &str, query: &Query) -> StoreResult<Option<Document>> {
        Ok(self.select(self.conn, collection, query)?.into_iter().next())
    }

    fn insert(&self, collection: &str, doc: &Document) -> StoreResult<()> {
        let id = document_id(doc)?;
        let body = serde_json::to_string(doc)?;
        let result = self.conn.execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3);",
            params![collection, id, body],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateId {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn update(&self, collection: &str, query: &Query, ops: &[UpdateOp]) -> StoreResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let docs = self.select(&tx, collection, query)?;
        let matched = docs.len();

        for mut doc in docs {
            let id = document_id(&doc)?.to_string();
            apply_update(&mut doc, ops)?;
            tx.execute(
                "UPDATE documents
                 SET body = ?3,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE collection = ?1
                   AND doc_id = ?2;",
                params![collection, id, serde_json::to_string(&doc)?],
            )?;
        }

        tx.commit()?;
        Ok(matched)
    }

    fn remove(&self, collection: &str, query: &Query) -> StoreResult<usize> {
        if let Query::Id(id) = query {
            let removed = self.conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2;",
                params![collection, id],
            )?;
            return Ok(removed);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let docs = self.select(&tx, collection, query)?;
        let mut removed = 0;
        for doc in &docs {
            removed += tx.execute(
                "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2;",
                params![collection, document_id(doc)?],
            )?;
        }
        tx.commit()?;
        Ok(removed)
    }
}

fn select_fields(doc: Document, fields: &[&str]) -> Document {
    let Value::Object(mut object) = doc else {
        return doc;
    };
    let mut selected = Map::new();
    if let Some(id) = object.remove(super::ID_FIELD) {
        selected.insert(super::ID_FIELD.to_string(), id);
    }
    for field in fields {
        if let Some(value) = object.remove(*field) {
            selected.insert((*field).to_string(), value);
        }
    }
    Value::Object(selected)
}

#[cfg(test)]
mod tests {
    use super::SqliteDocumentStore;
    use crate::db::open_db_in_memory;
    use crate::store::{DocumentStore, Query, StoreError, UpdateOp};
    use serde_json::json;

    #[test]
    fn insert_rejects_duplicate_id_within_collection_only() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();

        store.insert("lists", &json!({"id": "x", "title": "a"})).unwrap();
        store.insert("cards", &json!({"id": "x", "title": "b"})).unwrap();
        let err = store
            .insert("lists", &json!({"id": "x", "title": "c"}))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { ref id, .. } if id == "x"));
    }

    #[test]
    fn find_keeps_insertion_order_and_field_selection() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();
        for id in ["b", "a", "c"] {
            store
                .insert("lists", &json!({"id": id, "title": id, "cardOrder": []}))
                .unwrap();
        }

        let all = store.find("lists", &Query::All, &["title"]).unwrap();
        let ids: Vec<_> = all.iter().map(|doc| doc["id"].clone()).collect();
        assert_eq!(ids, vec![json!("b"), json!("a"), json!("c")]);
        assert!(all[0].get("cardOrder").is_none());
        assert_eq!(all[0]["title"], json!("b"));
    }

    #[test]
    fn update_returns_matched_count_and_leaves_row_untouched_on_operator_error() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();
        store
            .insert("cards", &json!({"id": "c1", "title": "t", "sessionIds": []}))
            .unwrap();

        let matched = store
            .update(
                "cards",
                &Query::id("c1"),
                &[UpdateOp::push("sessionIds", "s1")],
            )
            .unwrap();
        assert_eq!(matched, 1);
        let missing = store
            .update("cards", &Query::id("nope"), &[UpdateOp::set("title", "x")])
            .unwrap();
        assert_eq!(missing, 0);

        let err = store
            .update(
                "cards",
                &Query::id("c1"),
                &[UpdateOp::set("title", "changed"), UpdateOp::inc("title", 1.0)],
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidOperator { .. }));

        let doc = store.find_one("cards", &Query::id("c1")).unwrap().unwrap();
        assert_eq!(doc["title"], json!("t"));
        assert_eq!(doc["sessionIds"], json!(["s1"]));
    }

    #[test]
    fn remove_by_field_query_deletes_matching_documents() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();
        store.insert("moves", &json!({"id": "m1", "cardId": "c1"})).unwrap();
        store.insert("moves", &json!({"id": "m2", "cardId": "c2"})).unwrap();
        store.insert("moves", &json!({"id": "m3", "cardId": "c1"})).unwrap();

        let removed = store
            .remove(
                "moves",
                &Query::FieldEq {
                    field: "cardId".to_string(),
                    value: json!("c1"),
                },
            )
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.find("moves", &Query::All, &[]).unwrap().len(), 1);
    }
}
