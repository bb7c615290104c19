use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use quottie_api::{NetworkAuthor, NetworkResponse, NetworkWiki, QuotesDataSource, WikiDataSource};
use quottie_cache::AuthorBookmarksDao;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::classify::fetch_json;
use crate::models::{quote_numeric_query, Author, RemoteQuery, ResultFilter};
use crate::paging::{BookmarkOverlay, PageFetcher, Pager, PagingSource};
use crate::wiki::{apply_wiki_images, join_wiki_titles, WikiResource};
use crate::{DataError, ErrorKind, Result};

/// Authors: remote listing and search with wiki portraits, and bookmarks
#[derive(Clone)]
pub struct AuthorRepository {
    network: Arc<dyn QuotesDataSource>,
    wiki: Arc<dyn WikiDataSource>,
    bookmarks: AuthorBookmarksDao,
}

impl AuthorRepository {
    pub fn new(
        network: Arc<dyn QuotesDataSource>,
        wiki: Arc<dyn WikiDataSource>,
        bookmarks: AuthorBookmarksDao,
    ) -> Self {
        Self {
            network,
            wiki,
            bookmarks,
        }
    }

    /// One page from the list endpoint, without portraits
    pub async fn get_authors(
        &self,
        filter: &ResultFilter,
        slugs: &[String],
        page_size: u32,
        page: u32,
    ) -> Result<Vec<Author>> {
        let params = filter.list_params(slugs, page_size, page);
        let response: NetworkResponse<NetworkAuthor> =
            fetch_json(self.network.get_authors(&params)).await?;
        Ok(response.results.into_iter().map(Author::from).collect())
    }

    /// One page from the search endpoint, without portraits
    pub async fn get_search_authors(
        &self,
        filter: &ResultFilter,
        slugs: &[String],
        page_size: u32,
        page: u32,
    ) -> Result<Vec<Author>> {
        let params = filter.list_params(slugs, page_size, page);
        let query = quote_numeric_query(&filter.query);
        let response: NetworkResponse<NetworkAuthor> =
            fetch_json(self.network.search_authors(&query, &params)).await?;
        Ok(response.results.into_iter().map(Author::from).collect())
    }

    /// Page images for pipe-separated wiki titles
    pub async fn get_authors_wiki(&self, titles: &str) -> Result<WikiResource> {
        let wiki: NetworkWiki = fetch_json(self.wiki.get_page_images(titles)).await?;
        Ok(wiki.into())
    }

    /// Fill in portraits with one wiki lookup. A failed lookup leaves every
    /// image blank rather than failing the authors themselves.
    pub async fn with_wiki_images(&self, authors: Vec<Author>) -> Vec<Author> {
        if authors.is_empty() {
            return authors;
        }
        match self.get_authors_wiki(&join_wiki_titles(&authors)).await {
            Ok(wiki) => apply_wiki_images(authors, &wiki),
            Err(error) => {
                warn!(error = %error, count = authors.len(), "Wiki lookup failed, leaving images blank");
                authors
            }
        }
    }

    /// Search when the filter has a query, list otherwise; then portraits
    pub async fn get_page(
        &self,
        filter: &ResultFilter,
        slugs: &[String],
        page_size: u32,
        page: u32,
    ) -> Result<Vec<Author>> {
        let authors = match filter.remote_query() {
            RemoteQuery::List => self.get_authors(filter, slugs, page_size, page).await?,
            RemoteQuery::Search(_) => {
                self.get_search_authors(filter, slugs, page_size, page)
                    .await?
            }
        };
        Ok(self.with_wiki_images(authors).await)
    }

    pub fn get_paged(&self, filter: ResultFilter, slugs: Vec<String>, page_size: u32) -> Pager<Author> {
        let request = PageRequest {
            repository: self.clone(),
            filter,
            slugs,
            page_size,
        };
        let fetcher: Arc<dyn PageFetcher<Author>> = match request.filter.remote_query() {
            RemoteQuery::List => Arc::new(AuthorListFetcher(request)),
            RemoteQuery::Search(_) => Arc::new(AuthorSearchFetcher(request)),
        };
        let overlay = Arc::new(AuthorBookmarkOverlay {
            bookmarks: self.bookmarks.clone(),
        });
        Pager::new(PagingSource::new(fetcher).with_overlay(overlay))
    }

    /// A bookmarked author comes back as stored, portrait included. Anything
    /// else is fetched remotely and given a portrait.
    pub async fn get_detail(&self, id: &str) -> Result<Author> {
        match self.bookmarks.get(id) {
            Ok(Some(entity)) => {
                debug!(id, "Author served from bookmarks");
                return Ok(Author {
                    is_bookmarked: true,
                    ..Author::from(entity)
                });
            }
            Ok(None) => {}
            Err(error) => warn!(id, error = %error, "Bookmark lookup failed, fetching remotely"),
        }

        let author: NetworkAuthor = fetch_json(self.network.get_author_detail(id)).await?;
        let mut enriched = self.with_wiki_images(vec![author.into()]).await;
        enriched
            .pop()
            .ok_or_else(|| DataError::new(ErrorKind::Unknown, "author lost during enrichment"))
    }

    pub async fn save_bookmark(&self, author: &Author, is_bookmarked: bool) -> Result<()> {
        Ok(self.bookmarks.save(&author.to_entity(is_bookmarked))?)
    }

    pub async fn delete_bookmark(&self, id: &str) -> Result<()> {
        Ok(self.bookmarks.delete(id)?)
    }

    pub async fn get_bookmark(&self, id: &str) -> Result<Option<Author>> {
        Ok(self.bookmarks.get(id)?.map(Author::from))
    }

    pub fn bookmark_list_stream(&self) -> BoxStream<'static, Result<Vec<Author>>> {
        self.bookmarks
            .watch_all()
            .map(|result| {
                result
                    .map(|entities| entities.into_iter().map(Author::from).collect())
                    .map_err(DataError::from)
            })
            .boxed()
    }
}

struct PageRequest {
    repository: AuthorRepository,
    filter: ResultFilter,
    slugs: Vec<String>,
    page_size: u32,
}

struct AuthorListFetcher(PageRequest);

#[async_trait]
impl PageFetcher<Author> for AuthorListFetcher {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Author>> {
        let r = &self.0;
        let authors = r
            .repository
            .get_authors(&r.filter, &r.slugs, r.page_size, page)
            .await?;
        Ok(r.repository.with_wiki_images(authors).await)
    }
}

struct AuthorSearchFetcher(PageRequest);

#[async_trait]
impl PageFetcher<Author> for AuthorSearchFetcher {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Author>> {
        let r = &self.0;
        let authors = r
            .repository
            .get_search_authors(&r.filter, &r.slugs, r.page_size, page)
            .await?;
        Ok(r.repository.with_wiki_images(authors).await)
    }
}

struct AuthorBookmarkOverlay {
    bookmarks: AuthorBookmarksDao,
}

#[async_trait]
impl BookmarkOverlay<Author> for AuthorBookmarkOverlay {
    async fn overlay(&self, items: Vec<Author>) -> Result<Vec<Author>> {
        let ids: Vec<String> = items.iter().map(|author| author.id.clone()).collect();
        let bookmarked = self.bookmarks.bookmarked_ids(&ids)?;
        Ok(items
            .into_iter()
            .map(|author| Author {
                is_bookmarked: bookmarked.contains(&author.id),
                ..author
            })
            .collect())
    }
}
