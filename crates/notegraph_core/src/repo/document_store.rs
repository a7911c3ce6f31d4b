//! Document store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist whole JSON documents keyed by `(collection, id)`.
//! - Stamp `created_at`/`updated_at` on the store side.
//! - Apply batches of writes atomically.
//!
//! # Invariants
//! - `list` gives no ordering guarantee; callers must not rely on row order.
//! - `NotFound` is reported as its own error kind, distinct from transport
//!   failures, so callers can map it without inspecting messages.
//! - A failed `commit` leaves no write of the batch applied.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use log::{debug, error};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Transaction, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from document store operations.
#[derive(Debug)]
pub enum StoreError {
    /// No document stored under the key.
    NotFound { collection: String, id: String },
    /// A create targeted a key that is already taken.
    AlreadyExists { collection: String, id: String },
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Document body could not be encoded or decoded.
    Codec(serde_json::Error),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { collection, id } => {
                write!(f, "document not found: {collection}/{id}")
            }
            Self::AlreadyExists { collection, id } => {
                write!(f, "document already exists: {collection}/{id}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "invalid document body: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "document store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "document store requires table `{table}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Codec(err) => Some(err),
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
        Self::Codec(value)
    }
}

/// One stored document with store-assigned timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
    /// Epoch ms, set once on create.
    pub created_at: i64,
    /// Epoch ms, refreshed on every write.
    pub updated_at: i64,
}

impl Document {
    /// Decodes the body into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

/// One write inside an atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Create {
        collection: String,
        id: String,
        body: Value,
    },
    Update {
        collection: String,
        id: String,
        body: Value,
    },
    Delete {
        collection: String,
        id: String,
    },
}

impl WriteOp {
    pub fn create(
        collection: impl Into<String>,
        id: impl Into<String>,
        record: &impl Serialize,
    ) -> StoreResult<Self> {
        Ok(Self::Create {
            collection: collection.into(),
            id: id.into(),
            body: serde_json::to_value(record)?,
        })
    }

    pub fn update(
        collection: impl Into<String>,
        id: impl Into<String>,
        record: &impl Serialize,
    ) -> StoreResult<Self> {
        Ok(Self::Update {
            collection: collection.into(),
            id: id.into(),
            body: serde_json::to_value(record)?,
        })
    }

    pub fn delete(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Delete {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Collection targeted by this write.
    pub fn collection(&self) -> &str {
        match self {
            Self::Create { collection, .. }
            | Self::Update { collection, .. }
            | Self::Delete { collection, .. } => collection,
        }
    }
}

/// Whole-document store used by every repository.
///
/// Implementations are injected into repositories; the core never holds a
/// process-wide store handle.
pub trait DocumentStore {
    /// Allocates a fresh document id.
    fn new_id(&self) -> String;
    /// Loads one document. Returns `StoreError::NotFound` when absent.
    fn get(&self, collection: &str, id: &str) -> StoreResult<Document>;
    /// Loads every document directly inside `collection`, in no defined order.
    fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;
    /// Applies all writes or none of them.
    fn commit(&self, writes: Vec<WriteOp>) -> StoreResult<()>;

    /// Creates one document.
    fn create(&self, collection: &str, id: &str, record: &impl Serialize) -> StoreResult<()>
    where
        Self: Sized,
    {
        self.commit(vec![WriteOp::create(collection, id, record)?])
    }

    /// Replaces the body of one existing document.
    fn update(&self, collection: &str, id: &str, record: &impl Serialize) -> StoreResult<()>
    where
        Self: Sized,
    {
        self.commit(vec![WriteOp::update(collection, id, record)?])
    }

    /// Deletes one document. Deleting a missing document is not an error.
    fn delete(&self, collection: &str, id: &str) -> StoreResult<()>
    where
        Self: Sized,
    {
        self.commit(vec![WriteOp::delete(collection, id)])
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn new_id(&self) -> String {
        (**self).new_id()
    }

    fn get(&self, collection: &str, id: &str) -> StoreResult<Document> {
        (**self).get(collection, id)
    }

    fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        (**self).list(collection)
    }

    fn commit(&self, writes: Vec<WriteOp>) -> StoreResult<()> {
        (**self).commit(writes)
    }
}

/// SQLite-backed document store.
#[derive(Clone, Copy)]
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Creates store from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn get(&self, collection: &str, id: &str) -> StoreResult<Document> {
        let row: Option<(String, i64, i64)> = self
            .conn
            .query_row(
                "SELECT body, created_at, updated_at
                 FROM documents
                 WHERE collection = ?1
                   AND doc_id = ?2;",
                params![collection, id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let (body, created_at, updated_at) = row.ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;
        Ok(Document {
            id: id.to_string(),
            body: serde_json::from_str(&body)?,
            created_at,
            updated_at,
        })
    }

    fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let mut stmt = self.conn.prepare(
            "SELECT doc_id, body, created_at, updated_at
             FROM documents
             WHERE collection = ?1;",
        )?;
        let mut rows = stmt.query([collection])?;

        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            let body: String = row.get("body")?;
            documents.push(Document {
                id: row.get("doc_id")?,
                body: serde_json::from_str(&body)?,
                created_at: row.get("created_at")?,
                updated_at: row.get("updated_at")?,
            });
        }
        Ok(documents)
    }

    fn commit(&self, writes: Vec<WriteOp>) -> StoreResult<()> {
        let write_count = writes.len();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for write in writes {
            if let Err(err) = apply_write(&tx, write) {
                error!(
                    "event=store_commit module=repo status=error writes={write_count} error={err}"
                );
                return Err(err);
            }
        }
        tx.commit()?;
        debug!("event=store_commit module=repo status=ok writes={write_count}");
        Ok(())
    }
}

fn apply_write(conn: &Connection, write: WriteOp) -> StoreResult<()> {
    match write {
        WriteOp::Create {
            collection,
            id,
            body,
        } => {
            let inserted = conn.execute(
                "INSERT INTO documents (collection, doc_id, body)
                 VALUES (?1, ?2, ?3);",
                params![collection, id, serde_json::to_string(&body)?],
            );
            match inserted {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    Err(StoreError::AlreadyExists { collection, id })
                }
                Err(err) => Err(err.into()),
            }
        }
        WriteOp::Update {
            collection,
            id,
            body,
        } => {
            let changed = conn.execute(
                "UPDATE documents
                 SET body = ?3,
                     updated_at = CAST(unixepoch('now', 'subsec') * 1000 AS INTEGER)
                 WHERE collection = ?1
                   AND doc_id = ?2;",
                params![collection, id, serde_json::to_string(&body)?],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound { collection, id });
            }
            Ok(())
        }
        WriteOp::Delete { collection, id } => {
            conn.execute(
                "DELETE FROM documents
                 WHERE collection = ?1
                   AND doc_id = ?2;",
                params![collection, id],
            )?;
            Ok(())
        }
    }
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'documents'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(StoreError::MissingRequiredTable("documents"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{DocumentStore, SqliteDocumentStore, StoreError, WriteOp};
    use crate::db::open_db_in_memory;
    use rusqlite::Connection;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn create_get_update_delete_roundtrip() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();

        store.create("things", "a", &json!({"n": 1})).unwrap();
        let created = store.get("things", "a").unwrap();
        assert_eq!(created.body, json!({"n": 1}));
        assert!(created.created_at > 0);

        store.update("things", "a", &json!({"n": 2})).unwrap();
        assert_eq!(store.get("things", "a").unwrap().body, json!({"n": 2}));

        store.delete("things", "a").unwrap();
        store.delete("things", "a").unwrap();
        assert!(matches!(
            store.get("things", "a"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn timestamps_have_millisecond_resolution() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();

        store.create("things", "a", &json!({})).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        store.create("things", "b", &json!({})).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        store.update("things", "a", &json!({"n": 1})).unwrap();

        let a = store.get("things", "a").unwrap();
        let b = store.get("things", "b").unwrap();
        assert!(a.created_at < b.created_at);
        assert!(b.created_at < a.updated_at);
    }

    #[test]
    fn create_rejects_taken_key_and_update_rejects_missing_key() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();

        store.create("things", "a", &json!({})).unwrap();
        assert!(matches!(
            store.create("things", "a", &json!({})),
            Err(StoreError::AlreadyExists { .. })
        ));
        assert!(matches!(
            store.update("things", "missing", &json!({})),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn failed_batch_applies_nothing() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();

        let writes = vec![
            WriteOp::create("things", "fresh", &json!({})).unwrap(),
            WriteOp::update("things", "missing", &json!({})).unwrap(),
        ];
        assert!(store.commit(writes).is_err());
        assert!(store.list("things").unwrap().is_empty());
    }

    #[test]
    fn list_is_scoped_to_one_collection() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();

        store.create("a/b", "1", &json!({})).unwrap();
        store.create("a/b", "2", &json!({})).unwrap();
        store.create("a/b/1/c", "3", &json!({})).unwrap();

        let mut ids = store
            .list("a/b")
            .unwrap()
            .into_iter()
            .map(|doc| doc.id)
            .collect::<Vec<_>>();
        ids.sort();
        assert_eq!(ids, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn unmigrated_connection_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(matches!(
            SqliteDocumentStore::try_new(&conn),
            Err(StoreError::UninitializedConnection { .. })
        ));
    }
}
