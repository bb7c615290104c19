use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::database::{millis_to_datetime, tags_from_sql, tags_to_sql};
use crate::{Database, QuoteOfTheDayEntity, Result};

/// Single-row cache for the quote of the day
#[derive(Clone)]
pub struct QuoteOfTheDayDao {
    db: Database,
}

fn insert_row(conn: &Connection, quote: &QuoteOfTheDayEntity, tags: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT OR REPLACE INTO quote_of_the_day
            (id, content, author, author_slug, length, tags, last_fetched)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            quote.id,
            quote.content,
            quote.author,
            quote.author_slug,
            quote.length,
            tags,
            quote.last_fetched.timestamp_millis()
        ],
    )
}

impl QuoteOfTheDayDao {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn get(&self) -> Result<Option<QuoteOfTheDayEntity>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, content, author, author_slug, length, tags, last_fetched
                 FROM quote_of_the_day LIMIT 1",
                [],
                |row| {
                    Ok(QuoteOfTheDayEntity {
                        id: row.get(0)?,
                        content: row.get(1)?,
                        author: row.get(2)?,
                        author_slug: row.get(3)?,
                        length: row.get(4)?,
                        tags: tags_from_sql(5, row.get(5)?)?,
                        last_fetched: millis_to_datetime(row.get(6)?),
                    })
                },
            )
            .optional()
        })
    }

    pub fn delete_all(&self) -> Result<()> {
        self.db
            .with_conn(|conn| conn.execute("DELETE FROM quote_of_the_day", []))?;
        Ok(())
    }

    pub fn insert(&self, quote: &QuoteOfTheDayEntity) -> Result<()> {
        let tags = tags_to_sql(&quote.tags)?;
        self.db.with_conn(|conn| insert_row(conn, quote, &tags))?;
        Ok(())
    }

    /// Delete-then-insert inside one transaction. Readers either see the old
    /// row or the new one, never an empty table.
    pub fn replace(&self, quote: &QuoteOfTheDayEntity) -> Result<()> {
        let tags = tags_to_sql(&quote.tags)?;
        self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM quote_of_the_day", [])?;
            insert_row(&tx, quote, &tags)?;
            tx.commit()
        })?;
        info!(id = %quote.id, "Replaced quote of the day");
        Ok(())
    }
}
