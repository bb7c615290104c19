use futures::stream::{BoxStream, StreamExt};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{CacheError, Result};

/// Tables that can be observed as live collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    QuoteBookmarks = 0,
    AuthorBookmarks = 1,
    RecentSearches = 2,
}

const OBSERVED_TABLES: usize = 3;

/// Shared handle to the local SQLite database
///
/// One connection behind a mutex. SQLite serializes writers anyway and the
/// row counts here are tiny, so a pool would only add moving parts.
/// Each observable table carries a version counter that writers bump;
/// live queries re-run whenever it moves.
#[derive(Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

struct Inner {
    conn: Mutex<Connection>,
    changes: [watch::Sender<u64>; OBSERVED_TABLES],
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!(path = %path.display(), "Opening database");
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        Self::init_schema(&conn)?;

        Ok(Self {
            inner: Arc::new(Inner {
                conn: Mutex::new(conn),
                changes: [
                    watch::channel(0).0,
                    watch::channel(0).0,
                    watch::channel(0).0,
                ],
            }),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        // The bookmark tables and the quote of the day are independent on purpose:
        // no foreign keys between them.
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS quote_bookmarks (
                id TEXT PRIMARY KEY NOT NULL,
                content TEXT NOT NULL,
                author TEXT NOT NULL,
                author_slug TEXT NOT NULL DEFAULT '',
                length INTEGER NOT NULL,
                tags TEXT NOT NULL,
                is_bookmarked INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS author_bookmarks (
                id TEXT PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                bio TEXT NOT NULL,
                description TEXT NOT NULL,
                link TEXT NOT NULL,
                quote_count INTEGER NOT NULL,
                image TEXT NOT NULL,
                is_bookmarked INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS quote_of_the_day (
                id TEXT PRIMARY KEY NOT NULL,
                content TEXT NOT NULL,
                author TEXT NOT NULL,
                author_slug TEXT NOT NULL DEFAULT '',
                length INTEGER NOT NULL,
                tags TEXT NOT NULL,
                last_fetched INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS recent_search_queries (
                query TEXT PRIMARY KEY NOT NULL,
                queried_date INTEGER NOT NULL
            );",
        )?;

        Ok(())
    }

    /// Run `f` against the connection while holding the lock
    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let mut conn = self
            .inner
            .conn
            .lock()
            .map_err(|_| CacheError::LockPoisoned)?;
        Ok(f(&mut conn)?)
    }

    pub(crate) fn notify(&self, table: Table) {
        debug!(?table, "Table changed");
        self.inner.changes[table as usize].send_modify(|version| *version = version.wrapping_add(1));
    }

    pub(crate) fn subscribe(&self, table: Table) -> watch::Receiver<u64> {
        self.inner.changes[table as usize].subscribe()
    }

    /// Emit `query`'s result now and again after every change to `table`.
    /// Runs until the stream is dropped.
    pub(crate) fn live_query<T, F>(&self, table: Table, query: F) -> BoxStream<'static, Result<T>>
    where
        T: Send + 'static,
        F: Fn(&Database) -> Result<T> + Send + Sync + 'static,
    {
        let receiver = self.subscribe(table);
        let db = self.clone();

        futures::stream::unfold(
            (db, receiver, query, true),
            |(db, mut receiver, query, first)| async move {
                if !first && receiver.changed().await.is_err() {
                    return None;
                }
                let value = query(&db);
                Some((value, (db, receiver, query, false)))
            },
        )
        .boxed()
    }
}

pub(crate) fn tags_to_sql(tags: &[String]) -> Result<String> {
    Ok(serde_json::to_string(tags)?)
}

pub(crate) fn tags_from_sql(index: usize, raw: String) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn millis_to_datetime(millis: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp_millis(millis).unwrap_or_default()
}
