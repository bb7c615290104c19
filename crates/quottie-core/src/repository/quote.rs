use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use quottie_api::{NetworkQuote, NetworkResponse, QuotesDataSource};
use quottie_cache::{QuoteBookmarksDao, QuoteOfTheDayDao};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::classify::fetch_json;
use crate::clock::{Clock, SystemClock};
use crate::models::{quote_numeric_query, Quote, RemoteQuery, ResultFilter};
use crate::paging::{BookmarkOverlay, PageFetcher, Pager, PagingSource};
use crate::{DataError, ErrorKind, Result};

/// Quotes: remote listing and search, bookmarks, and the quote of the day
#[derive(Clone)]
pub struct QuoteRepository {
    network: Arc<dyn QuotesDataSource>,
    bookmarks: QuoteBookmarksDao,
    quote_of_the_day: QuoteOfTheDayDao,
    clock: Arc<dyn Clock>,
}

impl QuoteRepository {
    pub fn new(
        network: Arc<dyn QuotesDataSource>,
        bookmarks: QuoteBookmarksDao,
        quote_of_the_day: QuoteOfTheDayDao,
    ) -> Self {
        Self {
            network,
            bookmarks,
            quote_of_the_day,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn get_random_quotes(&self, limit: u32) -> Result<Vec<Quote>> {
        let quotes: Vec<NetworkQuote> = fetch_json(self.network.get_random_quotes(limit)).await?;
        Ok(quotes.into_iter().map(Quote::from).collect())
    }

    /// One page from the list endpoint; `filter.query` is ignored
    pub async fn get_quotes(
        &self,
        filter: &ResultFilter,
        slugs: &[String],
        page_size: u32,
        page: u32,
    ) -> Result<Vec<Quote>> {
        let params = filter.list_params(slugs, page_size, page);
        let response: NetworkResponse<NetworkQuote> =
            fetch_json(self.network.get_quotes(&params)).await?;
        Ok(response.results.into_iter().map(Quote::from).collect())
    }

    /// One page from the search endpoint for `filter.query`
    pub async fn get_search_quotes(
        &self,
        filter: &ResultFilter,
        slugs: &[String],
        page_size: u32,
        page: u32,
    ) -> Result<Vec<Quote>> {
        let params = filter.list_params(slugs, page_size, page);
        let query = quote_numeric_query(&filter.query);
        let response: NetworkResponse<NetworkQuote> =
            fetch_json(self.network.search_quotes(&query, &params)).await?;
        Ok(response.results.into_iter().map(Quote::from).collect())
    }

    /// Search when the filter has a query, list otherwise
    pub async fn get_page(
        &self,
        filter: &ResultFilter,
        slugs: &[String],
        page_size: u32,
        page: u32,
    ) -> Result<Vec<Quote>> {
        match filter.remote_query() {
            RemoteQuery::List => self.get_quotes(filter, slugs, page_size, page).await,
            RemoteQuery::Search(_) => self.get_search_quotes(filter, slugs, page_size, page).await,
        }
    }

    /// Pages of quotes with the bookmark flag set from the local store
    pub fn get_paged(&self, filter: ResultFilter, slugs: Vec<String>, page_size: u32) -> Pager<Quote> {
        let request = PageRequest {
            repository: self.clone(),
            filter,
            slugs,
            page_size,
        };
        let fetcher: Arc<dyn PageFetcher<Quote>> = match request.filter.remote_query() {
            RemoteQuery::List => Arc::new(QuoteListFetcher(request)),
            RemoteQuery::Search(_) => Arc::new(QuoteSearchFetcher(request)),
        };
        let overlay = Arc::new(QuoteBookmarkOverlay {
            bookmarks: self.bookmarks.clone(),
        });
        Pager::new(PagingSource::new(fetcher).with_overlay(overlay))
    }

    /// A bookmarked copy if there is one, otherwise the remote record
    pub async fn get_detail(&self, id: &str) -> Result<Quote> {
        match self.bookmarks.get(id) {
            Ok(Some(entity)) => {
                debug!(id, "Quote served from bookmarks");
                return Ok(Quote {
                    is_bookmarked: true,
                    ..Quote::from(entity)
                });
            }
            Ok(None) => {}
            Err(error) => warn!(id, error = %error, "Bookmark lookup failed, fetching remotely"),
        }

        let quote: NetworkQuote = fetch_json(self.network.get_quote_detail(id)).await?;
        Ok(quote.into())
    }

    /// Cached quote if it was fetched today (local calendar date), otherwise
    /// one random quote from the backend, which replaces the cached row
    pub async fn get_quote_of_the_day(&self) -> Result<Quote> {
        let today = self.clock.today();
        match self.quote_of_the_day.get() {
            Ok(Some(cached)) if self.clock.local_date(cached.last_fetched) == today => {
                debug!(id = %cached.id, "Quote of the day served from cache");
                return Ok(cached.into());
            }
            Ok(_) => {}
            Err(error) => warn!(error = %error, "Could not read cached quote of the day"),
        }

        let quote = self
            .get_random_quotes(1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DataError::new(ErrorKind::Unknown, "random quote response was empty"))?;

        self.quote_of_the_day
            .replace(&quote.to_quote_of_the_day(self.clock.now()))?;
        info!(id = %quote.id, "New quote of the day");
        Ok(quote)
    }

    pub async fn save_bookmark(&self, quote: &Quote, is_bookmarked: bool) -> Result<()> {
        Ok(self.bookmarks.save(&quote.to_entity(is_bookmarked))?)
    }

    pub async fn delete_bookmark(&self, id: &str) -> Result<()> {
        Ok(self.bookmarks.delete(id)?)
    }

    pub async fn get_bookmark(&self, id: &str) -> Result<Option<Quote>> {
        Ok(self.bookmarks.get(id)?.map(Quote::from))
    }

    /// Every bookmarked quote, re-emitted whenever bookmarks change
    pub fn bookmark_list_stream(&self) -> BoxStream<'static, Result<Vec<Quote>>> {
        self.bookmarks
            .watch_all()
            .map(|result| {
                result
                    .map(|entities| entities.into_iter().map(Quote::from).collect())
                    .map_err(DataError::from)
            })
            .boxed()
    }
}

struct PageRequest {
    repository: QuoteRepository,
    filter: ResultFilter,
    slugs: Vec<String>,
    page_size: u32,
}

struct QuoteListFetcher(PageRequest);

#[async_trait]
impl PageFetcher<Quote> for QuoteListFetcher {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Quote>> {
        let r = &self.0;
        r.repository
            .get_quotes(&r.filter, &r.slugs, r.page_size, page)
            .await
    }
}

struct QuoteSearchFetcher(PageRequest);

#[async_trait]
impl PageFetcher<Quote> for QuoteSearchFetcher {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Quote>> {
        let r = &self.0;
        r.repository
            .get_search_quotes(&r.filter, &r.slugs, r.page_size, page)
            .await
    }
}

struct QuoteBookmarkOverlay {
    bookmarks: QuoteBookmarksDao,
}

#[async_trait]
impl BookmarkOverlay<Quote> for QuoteBookmarkOverlay {
    async fn overlay(&self, items: Vec<Quote>) -> Result<Vec<Quote>> {
        let ids: Vec<String> = items.iter().map(|quote| quote.id.clone()).collect();
        let bookmarked = self.bookmarks.bookmarked_ids(&ids)?;
        Ok(items
            .into_iter()
            .map(|quote| Quote {
                is_bookmarked: bookmarked.contains(&quote.id),
                ..quote
            })
            .collect())
    }
}
