use futures::stream::BoxStream;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use std::collections::HashSet;
use tracing::debug;

use crate::database::{tags_from_sql, tags_to_sql};
use crate::{AuthorEntity, Database, QuoteEntity, Result, Table};

const QUOTE_COLUMNS: &str = "id, content, author, author_slug, length, tags, is_bookmarked";
const AUTHOR_COLUMNS: &str =
    "id, name, slug, bio, description, link, quote_count, image, is_bookmarked";

fn quote_from_row(row: &Row<'_>) -> rusqlite::Result<QuoteEntity> {
    Ok(QuoteEntity {
        id: row.get(0)?,
        content: row.get(1)?,
        author: row.get(2)?,
        author_slug: row.get(3)?,
        length: row.get(4)?,
        tags: tags_from_sql(5, row.get(5)?)?,
        is_bookmarked: row.get(6)?,
    })
}

fn author_from_row(row: &Row<'_>) -> rusqlite::Result<AuthorEntity> {
    Ok(AuthorEntity {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        bio: row.get(3)?,
        description: row.get(4)?,
        link: row.get(5)?,
        quote_count: row.get(6)?,
        image: row.get(7)?,
        is_bookmarked: row.get(8)?,
    })
}

/// Which of `ids` have a row in `table`. One query per call regardless of
/// how many ids come in.
fn existing_ids(db: &Database, table: &str, ids: &[String]) -> Result<HashSet<String>> {
    if ids.is_empty() {
        return Ok(HashSet::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("SELECT id FROM {} WHERE id IN ({})", table, placeholders);

    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), |row| row.get::<_, String>(0))?;
        rows.collect()
    })
}

/// Bookmarked quotes
#[derive(Clone)]
pub struct QuoteBookmarksDao {
    db: Database,
}

impl QuoteBookmarksDao {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert, replacing any existing row with the same id
    pub fn save(&self, quote: &QuoteEntity) -> Result<()> {
        let tags = tags_to_sql(&quote.tags)?;
        self.db.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO quote_bookmarks ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    QUOTE_COLUMNS
                ),
                params![
                    quote.id,
                    quote.content,
                    quote.author,
                    quote.author_slug,
                    quote.length,
                    tags,
                    quote.is_bookmarked
                ],
            )
        })?;
        debug!(id = %quote.id, "Saved quote bookmark");
        self.db.notify(Table::QuoteBookmarks);
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let removed = self
            .db
            .with_conn(|conn| conn.execute("DELETE FROM quote_bookmarks WHERE id = ?1", [id]))?;
        if removed > 0 {
            self.db.notify(Table::QuoteBookmarks);
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<QuoteEntity>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM quote_bookmarks WHERE id = ?1", QUOTE_COLUMNS),
                [id],
                quote_from_row,
            )
            .optional()
        })
    }

    pub fn bookmarked_ids(&self, ids: &[String]) -> Result<HashSet<String>> {
        existing_ids(&self.db, "quote_bookmarks", ids)
    }

    /// All bookmarks in the order they were added
    pub fn get_all(&self) -> Result<Vec<QuoteEntity>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM quote_bookmarks ORDER BY rowid",
                QUOTE_COLUMNS
            ))?;
            let rows = stmt.query_map([], quote_from_row)?;
            rows.collect()
        })
    }

    /// Live view of `get_all`
    pub fn watch_all(&self) -> BoxStream<'static, Result<Vec<QuoteEntity>>> {
        self.db
            .live_query(Table::QuoteBookmarks, |db| QuoteBookmarksDao::new(db.clone()).get_all())
    }
}

/// Bookmarked authors
#[derive(Clone)]
pub struct AuthorBookmarksDao {
    db: Database,
}

impl AuthorBookmarksDao {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn save(&self, author: &AuthorEntity) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO author_bookmarks ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    AUTHOR_COLUMNS
                ),
                params![
                    author.id,
                    author.name,
                    author.slug,
                    author.bio,
                    author.description,
                    author.link,
                    author.quote_count,
                    author.image,
                    author.is_bookmarked
                ],
            )
        })?;
        debug!(id = %author.id, "Saved author bookmark");
        self.db.notify(Table::AuthorBookmarks);
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let removed = self
            .db
            .with_conn(|conn| conn.execute("DELETE FROM author_bookmarks WHERE id = ?1", [id]))?;
        if removed > 0 {
            self.db.notify(Table::AuthorBookmarks);
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<AuthorEntity>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM author_bookmarks WHERE id = ?1", AUTHOR_COLUMNS),
                [id],
                author_from_row,
            )
            .optional()
        })
    }

    pub fn bookmarked_ids(&self, ids: &[String]) -> Result<HashSet<String>> {
        existing_ids(&self.db, "author_bookmarks", ids)
    }

    pub fn get_all(&self) -> Result<Vec<AuthorEntity>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM author_bookmarks ORDER BY rowid",
                AUTHOR_COLUMNS
            ))?;
            let rows = stmt.query_map([], author_from_row)?;
            rows.collect()
        })
    }

    pub fn watch_all(&self) -> BoxStream<'static, Result<Vec<AuthorEntity>>> {
        self.db
            .live_query(Table::AuthorBookmarks, |db| AuthorBookmarksDao::new(db.clone()).get_all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn quote(id: &str) -> QuoteEntity {
        QuoteEntity {
            id: id.to_string(),
            content: "Be yourself; everyone else is already taken.".to_string(),
            author: "Oscar Wilde".to_string(),
            author_slug: "oscar-wilde".to_string(),
            length: 44,
            tags: vec!["Famous Quotes".to_string()],
            is_bookmarked: true,
        }
    }

    fn author(id: &str) -> AuthorEntity {
        AuthorEntity {
            id: id.to_string(),
            name: "Mark Twain".to_string(),
            slug: "mark-twain".to_string(),
            bio: "American writer".to_string(),
            description: "American author and humorist".to_string(),
            link: "https://en.wikipedia.org/wiki/Mark_Twain".to_string(),
            quote_count: 12,
            image: "https://upload.example/twain.jpg".to_string(),
            is_bookmarked: true,
        }
    }

    #[test]
    fn test_quote_save_get_delete() {
        let dao = QuoteBookmarksDao::new(Database::open_in_memory().unwrap());

        dao.save(&quote("q1")).unwrap();
        assert_eq!(dao.get("q1").unwrap(), Some(quote("q1")));

        dao.delete("q1").unwrap();
        assert_eq!(dao.get("q1").unwrap(), None);
    }

    #[test]
    fn test_save_replaces_by_id() {
        let dao = QuoteBookmarksDao::new(Database::open_in_memory().unwrap());

        dao.save(&quote("q1")).unwrap();
        let mut edited = quote("q1");
        edited.is_bookmarked = false;
        dao.save(&edited).unwrap();

        let all = dao.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].is_bookmarked);
    }

    #[test]
    fn test_bookmarked_ids_batch() {
        let dao = QuoteBookmarksDao::new(Database::open_in_memory().unwrap());
        dao.save(&quote("a")).unwrap();
        dao.save(&quote("c")).unwrap();

        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let found = dao.bookmarked_ids(&ids).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.contains("a") && found.contains("c"));
        assert!(dao.bookmarked_ids(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_author_round_trip_keeps_image() {
        let dao = AuthorBookmarksDao::new(Database::open_in_memory().unwrap());
        dao.save(&author("a1")).unwrap();

        let stored = dao.get("a1").unwrap().unwrap();
        assert_eq!(stored.image, "https://upload.example/twain.jpg");
        assert_eq!(stored.quote_count, 12);
    }

    #[test]
    fn test_tables_are_independent() {
        let db = Database::open_in_memory().unwrap();
        let quotes = QuoteBookmarksDao::new(db.clone());
        let authors = AuthorBookmarksDao::new(db);

        quotes.save(&quote("same-id")).unwrap();
        assert!(authors.get("same-id").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_watch_all_follows_writes() {
        let dao = QuoteBookmarksDao::new(Database::open_in_memory().unwrap());
        let mut live = dao.watch_all();

        assert!(live.next().await.unwrap().unwrap().is_empty());

        dao.save(&quote("q1")).unwrap();
        let after_save = live.next().await.unwrap().unwrap();
        assert_eq!(after_save.len(), 1);

        dao.delete("q1").unwrap();
        assert!(live.next().await.unwrap().unwrap().is_empty());
    }
}
