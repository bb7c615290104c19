use futures::stream::{BoxStream, StreamExt};
use quottie_cache::{RecentSearchQueryDao, RecentSearchQueryEntity};
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::models::RecentSearchQuery;
use crate::{DataError, Result};

/// Recently searched queries
#[derive(Clone)]
pub struct SearchRepository {
    recent: RecentSearchQueryDao,
    clock: Arc<dyn Clock>,
}

impl SearchRepository {
    pub fn new(recent: RecentSearchQueryDao) -> Self {
        Self {
            recent,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Record `query` as searched now. Repeating a query moves it to the top.
    pub async fn insert_or_replace_recent_search(&self, query: &str) -> Result<()> {
        let entry = RecentSearchQueryEntity {
            query: query.to_string(),
            queried_date: self.clock.now(),
        };
        Ok(self.recent.insert_or_replace(&entry)?)
    }

    /// Newest `limit` queries, re-emitted on every change
    pub fn get_recent_search_queries(
        &self,
        limit: u32,
    ) -> BoxStream<'static, Result<Vec<RecentSearchQuery>>> {
        self.recent
            .watch_recent(limit)
            .map(|result| {
                result
                    .map(|entries| entries.into_iter().map(RecentSearchQuery::from).collect())
                    .map_err(DataError::from)
            })
            .boxed()
    }

    pub async fn clear_recent_searches(&self) -> Result<()> {
        Ok(self.recent.clear()?)
    }
}
