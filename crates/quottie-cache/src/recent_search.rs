use futures::stream::BoxStream;
use rusqlite::params;

use crate::database::millis_to_datetime;
use crate::{Database, RecentSearchQueryEntity, Result, Table};

/// Queries the user searched for, newest first
#[derive(Clone)]
pub struct RecentSearchQueryDao {
    db: Database,
}

impl RecentSearchQueryDao {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Searching the same text again only bumps its timestamp
    pub fn insert_or_replace(&self, entry: &RecentSearchQueryEntity) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO recent_search_queries (query, queried_date) VALUES (?1, ?2)",
                params![entry.query, entry.queried_date.timestamp_millis()],
            )
        })?;
        self.db.notify(Table::RecentSearches);
        Ok(())
    }

    pub fn get_recent(&self, limit: u32) -> Result<Vec<RecentSearchQueryEntity>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT query, queried_date FROM recent_search_queries
                 ORDER BY queried_date DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map([limit], |row| {
                Ok(RecentSearchQueryEntity {
                    query: row.get(0)?,
                    queried_date: millis_to_datetime(row.get(1)?),
                })
            })?;
            rows.collect()
        })
    }

    pub fn watch_recent(&self, limit: u32) -> BoxStream<'static, Result<Vec<RecentSearchQueryEntity>>> {
        self.db.live_query(Table::RecentSearches, move |db| {
            RecentSearchQueryDao::new(db.clone()).get_recent(limit)
        })
    }

    pub fn clear(&self) -> Result<()> {
        self.db
            .with_conn(|conn| conn.execute("DELETE FROM recent_search_queries", []))?;
        self.db.notify(Table::RecentSearches);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn searched(query: &str, minutes_ago: i64) -> RecentSearchQueryEntity {
        RecentSearchQueryEntity {
            query: query.to_string(),
            queried_date: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_recent_is_newest_first_and_limited() {
        let dao = RecentSearchQueryDao::new(Database::open_in_memory().unwrap());
        dao.insert_or_replace(&searched("love", 30)).unwrap();
        dao.insert_or_replace(&searched("time", 20)).unwrap();
        dao.insert_or_replace(&searched("wisdom", 10)).unwrap();

        let recent = dao.get_recent(2).unwrap();
        let queries: Vec<&str> = recent.iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["wisdom", "time"]);
    }

    #[test]
    fn test_repeat_search_moves_to_top() {
        let dao = RecentSearchQueryDao::new(Database::open_in_memory().unwrap());
        dao.insert_or_replace(&searched("love", 30)).unwrap();
        dao.insert_or_replace(&searched("time", 20)).unwrap();
        dao.insert_or_replace(&searched("love", 0)).unwrap();

        let recent = dao.get_recent(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].query, "love");
    }

    #[test]
    fn test_clear() {
        let dao = RecentSearchQueryDao::new(Database::open_in_memory().unwrap());
        dao.insert_or_replace(&searched("love", 1)).unwrap();
        dao.clear().unwrap();
        assert!(dao.get_recent(10).unwrap().is_empty());
    }
}
