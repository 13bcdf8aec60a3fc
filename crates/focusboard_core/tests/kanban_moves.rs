use focusboard_core::db::{open_db_in_memory, DbError};
use focusboard_core::store::{Document, StoreResult};
use focusboard_core::{
    Board, DocumentStore, Entity, KanbanError, KanbanService, List, ListId, MoveRecord,
    OrderingError, Query, SqliteDocumentStore, StoreError, UpdateOp,
};
use serde_json::{json, Value};
use uuid::Uuid;

/// Store wrapper whose move-history collection refuses every insert.
struct ReadOnlyHistoryStore<'conn> {
    inner: SqliteDocumentStore<'conn>,
}

impl DocumentStore for ReadOnlyHistoryStore<'_> {
    fn find(&self, collection: &str, query: &Query, fields: &[&str]) -> StoreResult<Vec<Document>> {
        self.inner.find(collection, query, fields)
    }

    fn find_one(&self, collection: &str, query: &Query) -> StoreResult<Option<Document>> {
        self.inner.find_one(collection, query)
    }

    fn insert(&self, collection: &str, doc: &Document) -> StoreResult<()> {
        if collection == MoveRecord::COLLECTION {
            return Err(StoreError::Db(DbError::Sqlite(
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_READONLY),
                    Some("move history is read-only".to_string()),
                ),
            )));
        }
        self.inner.insert(collection, doc)
    }

    fn update(&self, collection: &str, query: &Query, ops: &[UpdateOp]) -> StoreResult<usize> {
        self.inner.update(collection, query, ops)
    }

    fn remove(&self, collection: &str, query: &Query) -> StoreResult<usize> {
        self.inner.remove(collection, query)
    }
}

fn list_ids(service: &KanbanService<SqliteDocumentStore<'_>>, board: &Board) -> Vec<ListId> {
    service.view().board(board.id).unwrap().list_order.clone()
}

fn stored(service: &KanbanService<SqliteDocumentStore<'_>>, collection: &str, id: Uuid) -> Value {
    service
        .store()
        .find_one(collection, &Query::id(id))
        .unwrap()
        .unwrap()
}

fn id_strings(ids: &[Uuid]) -> Value {
    json!(ids.iter().map(Uuid::to_string).collect::<Vec<_>>())
}

#[test]
fn move_list_uses_splice_semantics() {
    let conn = open_db_in_memory().unwrap();
    let mut service = KanbanService::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let board = service.create_board("Sprint", "").unwrap();
    let [l1, l2, l3] = [board.list_order[0], board.list_order[1], board.list_order[2]];

    service.move_list(board.id, 2, 0).unwrap();
    assert_eq!(list_ids(&service, &board), vec![l3, l1, l2]);

    assert!(service.flush().is_clean());
    assert_eq!(
        stored(&service, Board::COLLECTION, board.id)["listOrder"],
        id_strings(&[l3, l1, l2])
    );
}

#[test]
fn move_card_across_lists_updates_both_orders_and_writes_audit_record() {
    let conn = open_db_in_memory().unwrap();
    let mut service = KanbanService::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let board = service.create_board("Sprint", "").unwrap();
    let (list_a, list_b) = (board.list_order[0], board.list_order[2]);
    let c1 = service.add_card(list_a, "c1", "").unwrap().id;
    let c2 = service.add_card(list_a, "c2", "").unwrap().id;
    let c3 = service.add_card(list_a, "c3", "").unwrap().id;
    let c4 = service.add_card(list_b, "c4", "").unwrap().id;

    let moved = service.move_card(list_a, list_b, 1, 1).unwrap();
    assert_eq!(moved.card_id, c2);
    assert!(moved.destination_write.is_some());
    let audit = moved.audit_write.unwrap();

    let view = service.view();
    assert_eq!(view.list(list_a).unwrap().card_order, vec![c1, c3]);
    assert_eq!(view.list(list_b).unwrap().card_order, vec![c4, c2]);

    let report = service.flush();
    assert!(report.is_clean());
    assert!(report.get(audit).unwrap().is_ok());

    assert_eq!(
        stored(&service, List::COLLECTION, list_a)["cardOrder"],
        id_strings(&[c1, c3])
    );
    assert_eq!(
        stored(&service, List::COLLECTION, list_b)["cardOrder"],
        id_strings(&[c4, c2])
    );

    let moves = service
        .store()
        .find(MoveRecord::COLLECTION, &Query::All, &[])
        .unwrap();
    assert_eq!(moves.len(), 1);
    let record: MoveRecord = serde_json::from_value(moves[0].clone()).unwrap();
    assert_eq!(record.from_list_id, list_a);
    assert_eq!(record.to_list_id, list_b);
    assert_eq!(record.card_id, c2);
    assert!(record.timestamp > 0);
}

#[test]
fn move_card_within_one_list_writes_no_audit_record() {
    let conn = open_db_in_memory().unwrap();
    let mut service = KanbanService::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let board = service.create_board("Sprint", "").unwrap();
    let list = board.list_order[0];
    let c1 = service.add_card(list, "c1", "").unwrap().id;
    let c2 = service.add_card(list, "c2", "").unwrap().id;
    let c3 = service.add_card(list, "c3", "").unwrap().id;

    let moved = service.move_card(list, list, 0, 2).unwrap();
    assert_eq!(moved.card_id, c1);
    assert!(moved.destination_write.is_none());
    assert!(moved.audit_write.is_none());
    assert_eq!(service.view().list(list).unwrap().card_order, vec![c2, c3, c1]);

    assert!(service.flush().is_clean());
    let moves = service
        .store()
        .find(MoveRecord::COLLECTION, &Query::All, &[])
        .unwrap();
    assert!(moves.is_empty());
}

#[test]
fn cross_list_move_keeps_card_in_exactly_one_list() {
    let conn = open_db_in_memory().unwrap();
    let mut service = KanbanService::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let board = service.create_board("Sprint", "").unwrap();
    let (from, to) = (board.list_order[0], board.list_order[1]);
    let card = service.add_card(from, "only", "").unwrap().id;

    service.move_card(from, to, 0, 0).unwrap();

    let view = service.view();
    assert!(view.list(from).unwrap().card_order.is_empty());
    assert_eq!(view.list(to).unwrap().card_order, vec![card]);
    assert_eq!(view.owning_list(card).unwrap().id, to);
    assert!(service.check_integrity().is_empty());
}

#[test]
fn invalid_moves_are_rejected_before_any_mutation() {
    let conn = open_db_in_memory().unwrap();
    let mut service = KanbanService::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let board = service.create_board("Sprint", "").unwrap();
    let (from, to) = (board.list_order[0], board.list_order[1]);
    service.add_card(from, "c1", "").unwrap();
    service.flush();

    let err = service.move_list(board.id, 3, 0).unwrap_err();
    assert!(matches!(
        err,
        KanbanError::Ordering(OrderingError::IndexOutOfBounds { index: 3, len: 3 })
    ));

    let err = service.move_card(from, to, 0, 5).unwrap_err();
    assert!(matches!(
        err,
        KanbanError::Ordering(OrderingError::IndexOutOfBounds { index: 5, len: 0 })
    ));

    let err = service.move_card(from, Uuid::new_v4(), 0, 0).unwrap_err();
    assert!(matches!(err, KanbanError::Repo(_)));

    assert_eq!(service.pending_writes(), 0);
    assert_eq!(service.view().list(from).unwrap().card_order.len(), 1);
    assert_eq!(list_ids(&service, &board), board.list_order);
}

#[test]
fn attach_card_refuses_card_owned_by_another_list() {
    let conn = open_db_in_memory().unwrap();
    let mut service = KanbanService::new(SqliteDocumentStore::try_new(&conn).unwrap());
    let board = service.create_board("Sprint", "").unwrap();
    let (owner, other) = (board.list_order[0], board.list_order[1]);
    let card = service.add_card(owner, "c1", "").unwrap().id;

    let err = service.attach_card(other, card).unwrap_err();
    assert!(matches!(
        err,
        KanbanError::CardAlreadyInList { list_id, card_id } if list_id == owner && card_id == card
    ));
}

#[test]
fn failed_audit_write_keeps_cross_list_move() {
    let conn = open_db_in_memory().unwrap();
    let store = ReadOnlyHistoryStore {
        inner: SqliteDocumentStore::try_new(&conn).unwrap(),
    };
    let mut service = KanbanService::new(store);
    let board = service.create_board("Sprint", "").unwrap();
    let (from, to) = (board.list_order[0], board.list_order[1]);
    let c1 = service.add_card(from, "c1", "").unwrap().id;
    let c2 = service.add_card(from, "c2", "").unwrap().id;
    assert!(service.flush().is_clean());

    let moved = service.move_card(from, to, 0, 0).unwrap();
    let audit = moved.audit_write.unwrap();

    let report = service.flush();
    assert!(!report.get(audit).unwrap().is_ok());
    assert_eq!(report.failures().count(), 1);
    assert_eq!(report.entity_failures().count(), 0);
    assert!(report.get(moved.source_write).unwrap().is_ok());
    assert!(report.get(moved.destination_write.unwrap()).unwrap().is_ok());

    let from_doc = service
        .store()
        .find_one(List::COLLECTION, &Query::id(from))
        .unwrap()
        .unwrap();
    assert_eq!(from_doc["cardOrder"], id_strings(&[c2]));
    let to_doc = service
        .store()
        .find_one(List::COLLECTION, &Query::id(to))
        .unwrap()
        .unwrap();
    assert_eq!(to_doc["cardOrder"], id_strings(&[c1]));

    let view = service.view();
    assert_eq!(view.list(to).unwrap().card_order, vec![c1]);
    assert_eq!(view.owning_list(c1).unwrap().id, to);
    assert!(service
        .store()
        .find(MoveRecord::COLLECTION, &Query::All, &[])
        .unwrap()
        .is_empty());
}
