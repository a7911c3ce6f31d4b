//! SQLite bootstrap for the `documents` table behind
//! [`SqliteDocumentStore`](crate::repo::document_store::SqliteDocumentStore).
//!
//! # Responsibility
//! - Open connections with foreign keys on and a busy timeout set.
//! - Bring the `documents(collection, doc_id, body, created_at, updated_at)`
//!   schema up to [`migrations::latest_version`].
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`; a database newer
//!   than this binary is refused, never downgraded.
//! - Connections from [`open_db`] and [`open_db_in_memory`] are fully
//!   migrated; `SqliteDocumentStore::try_new` rejects any other version.
//! - Timestamp columns hold epoch milliseconds stamped by SQLite.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Errors from opening or migrating the document database.
#[derive(Debug)]
pub enum DbError {
    /// SQLite rejected a statement or the connection.
    Sqlite(rusqlite::Error),
    /// File was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "document database is at schema version {db_version}, this build supports up to {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
