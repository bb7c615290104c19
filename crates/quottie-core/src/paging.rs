// Incremental loading over 1-based page numbers.
//
// `PagingSource` knows how to turn a key into one page. `Pager` owns the
// pages loaded so far and decides which key comes next. A failed load
// leaves the loaded pages alone and can be retried with the same key.
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{DataError, Result};

/// Fetches one page of items from wherever they live
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<Vec<T>>;
}

/// Sets the bookmark flag on a freshly fetched page, in one local lookup
#[async_trait]
pub trait BookmarkOverlay<T>: Send + Sync {
    async fn overlay(&self, items: Vec<T>) -> Result<Vec<T>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub prev_key: Option<u32>,
    pub next_key: Option<u32>,
}

#[derive(Debug, Clone)]
pub enum LoadResult<T> {
    Page(Page<T>),
    Error(DataError),
}

/// Snapshot used to pick a resume key when paging restarts
#[derive(Debug)]
pub struct PagingState<'a, T> {
    pub pages: &'a [Page<T>],
    /// Index of the item the consumer was looking at, across all pages
    pub anchor_position: Option<usize>,
}

impl<'a, T> PagingState<'a, T> {
    /// Page containing `position`, or the last page if it lies past the end
    pub fn closest_page_to_position(&self, position: usize) -> Option<&'a Page<T>> {
        let mut start = 0;
        for page in self.pages {
            let end = start + page.data.len();
            if position < end {
                return Some(page);
            }
            start = end;
        }
        self.pages.last()
    }
}

pub struct PagingSource<T> {
    fetcher: Arc<dyn PageFetcher<T>>,
    overlay: Option<Arc<dyn BookmarkOverlay<T>>>,
}

impl<T> Clone for PagingSource<T> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            overlay: self.overlay.clone(),
        }
    }
}

impl<T: Send + 'static> PagingSource<T> {
    pub fn new(fetcher: Arc<dyn PageFetcher<T>>) -> Self {
        Self {
            fetcher,
            overlay: None,
        }
    }

    pub fn with_overlay(mut self, overlay: Arc<dyn BookmarkOverlay<T>>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Load the page for `key` (page 1 when absent). Pages are 1-based, so
    /// a key of 0 loads page 1.
    pub async fn load(&self, key: Option<u32>) -> LoadResult<T> {
        let page = key.unwrap_or(1).max(1);
        debug!(page, "Loading page");

        let data = match self.fetch(page).await {
            Ok(data) => data,
            Err(error) => return LoadResult::Error(error),
        };

        LoadResult::Page(Page {
            prev_key: if page == 1 { None } else { Some(page - 1) },
            next_key: if data.is_empty() { None } else { page.checked_add(1) },
            data,
        })
    }

    async fn fetch(&self, page: u32) -> Result<Vec<T>> {
        let data = self.fetcher.fetch_page(page).await?;
        match &self.overlay {
            Some(overlay) if !data.is_empty() => overlay.overlay(data).await,
            _ => Ok(data),
        }
    }

    /// Key to resume from after a restart, `None` for a fresh start
    pub fn refresh_key(&self, state: &PagingState<'_, T>) -> Option<u32> {
        let anchor = state.anchor_position?;
        let page = state.closest_page_to_position(anchor)?;
        page.prev_key
            .map(|prev| prev + 1)
            .or_else(|| page.next_key.map(|next| next - 1))
    }
}

#[derive(Debug, Clone)]
pub enum LoadState {
    Idle,
    /// The last load failed; `Pager::retry` re-issues it
    Error(DataError),
    EndReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Append,
    Prepend,
}

/// Drives a `PagingSource`, one load at a time
pub struct Pager<T> {
    source: PagingSource<T>,
    pages: Vec<Page<T>>,
    initial_key: Option<u32>,
    load_state: LoadState,
    failed: Option<(Direction, Option<u32>)>,
}

impl<T: Send + 'static> Pager<T> {
    pub fn new(source: PagingSource<T>) -> Self {
        Self {
            source,
            pages: Vec::new(),
            initial_key: None,
            load_state: LoadState::Idle,
            failed: None,
        }
    }

    /// Start from `key` instead of page 1
    pub fn starting_at(source: PagingSource<T>, key: u32) -> Self {
        Self {
            initial_key: Some(key),
            ..Self::new(source)
        }
    }

    pub fn pages(&self) -> &[Page<T>] {
        &self.pages
    }

    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|page| page.data.iter())
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub async fn load_next(&mut self) -> &LoadState {
        let key = match self.pages.last() {
            None => self.initial_key,
            Some(page) => match page.next_key {
                Some(next) => Some(next),
                None => {
                    self.load_state = LoadState::EndReached;
                    return &self.load_state;
                }
            },
        };
        self.run(Direction::Append, key).await
    }

    /// Load the page before the first loaded one, if there is one
    pub async fn load_previous(&mut self) -> &LoadState {
        match self.pages.first().and_then(|page| page.prev_key) {
            Some(key) => self.run(Direction::Prepend, Some(key)).await,
            None => &self.load_state,
        }
    }

    pub async fn retry(&mut self) -> &LoadState {
        match self.failed.take() {
            Some((direction, key)) => self.run(direction, key).await,
            None => &self.load_state,
        }
    }

    /// Drop everything and restart near `anchor_position`
    pub async fn refresh(&mut self, anchor_position: Option<usize>) -> &LoadState {
        let state = PagingState {
            pages: &self.pages,
            anchor_position,
        };
        let key = self.source.refresh_key(&state);

        self.pages.clear();
        self.failed = None;
        self.initial_key = key;
        self.load_state = LoadState::Idle;
        self.run(Direction::Append, key).await
    }

    async fn run(&mut self, direction: Direction, key: Option<u32>) -> &LoadState {
        match self.source.load(key).await {
            LoadResult::Page(page) => {
                let end_reached = direction == Direction::Append && page.next_key.is_none();
                match direction {
                    Direction::Append => self.pages.push(page),
                    Direction::Prepend => self.pages.insert(0, page),
                }
                self.failed = None;
                self.load_state = if end_reached {
                    LoadState::EndReached
                } else {
                    LoadState::Idle
                };
            }
            LoadResult::Error(error) => {
                warn!(page = key.unwrap_or(1), error = %error, "Page load failed");
                self.failed = Some((direction, key));
                self.load_state = LoadState::Error(error);
            }
        }
        &self.load_state
    }
}

impl<T: Clone + Send + 'static> Pager<T> {
    /// Forward pages as a stream, one item list per load
    ///
    /// A failed load yields `Err` and the next poll retries the same page.
    /// The stream ends after the first empty page.
    pub fn into_stream(self) -> BoxStream<'static, Result<Vec<T>>> {
        stream::unfold(self, |mut pager| async move {
            let state = pager.load_next().await.clone();
            match state {
                LoadState::EndReached => None,
                LoadState::Error(error) => Some((Err(error), pager)),
                LoadState::Idle => {
                    let data = pager
                        .pages
                        .last()
                        .map(|page| page.data.clone())
                        .unwrap_or_default();
                    Some((Ok(data), pager))
                }
            }
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item {
        id: u32,
        marked: bool,
    }

    /// Three items per page up to `last_page`, then empty pages
    struct FakeFetcher {
        last_page: u32,
        failing: Mutex<Option<u32>>,
        calls: Mutex<Vec<u32>>,
    }

    impl FakeFetcher {
        fn new(last_page: u32) -> Self {
            Self {
                last_page,
                failing: Mutex::new(None),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn fail_on(&self, page: Option<u32>) {
            *self.failing.lock().unwrap() = page;
        }

        fn calls(&self) -> Vec<u32> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher<Item> for FakeFetcher {
        async fn fetch_page(&self, page: u32) -> Result<Vec<Item>> {
            self.calls.lock().unwrap().push(page);
            if *self.failing.lock().unwrap() == Some(page) {
                return Err(DataError::new(ErrorKind::ServerError, "boom"));
            }
            if page > self.last_page {
                return Ok(Vec::new());
            }
            Ok((0..3)
                .map(|i| Item {
                    id: (page - 1) * 3 + i,
                    marked: false,
                })
                .collect())
        }
    }

    struct MarkEven;

    #[async_trait]
    impl BookmarkOverlay<Item> for MarkEven {
        async fn overlay(&self, items: Vec<Item>) -> Result<Vec<Item>> {
            Ok(items
                .into_iter()
                .map(|item| Item {
                    marked: item.id % 2 == 0,
                    ..item
                })
                .collect())
        }
    }

    fn source(fetcher: &Arc<FakeFetcher>) -> PagingSource<Item> {
        PagingSource::new(Arc::clone(fetcher) as Arc<dyn PageFetcher<Item>>)
    }

    fn page_of(result: LoadResult<Item>) -> Page<Item> {
        match result {
            LoadResult::Page(page) => page,
            LoadResult::Error(e) => panic!("unexpected error: {}", e),
        }
    }

    #[tokio::test]
    async fn test_first_page_has_no_prev_key() {
        let fetcher = Arc::new(FakeFetcher::new(5));
        let page = page_of(source(&fetcher).load(None).await);

        assert_eq!(page.prev_key, None);
        assert_eq!(page.next_key, Some(2));
        assert_eq!(fetcher.calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_zero_key_loads_first_page() {
        let fetcher = Arc::new(FakeFetcher::new(5));
        let page = page_of(source(&fetcher).load(Some(0)).await);

        assert_eq!(page.prev_key, None);
        assert_eq!(page.next_key, Some(2));
        assert_eq!(fetcher.calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_pager_starting_at_zero() {
        let fetcher = Arc::new(FakeFetcher::new(2));
        let mut pager = Pager::starting_at(source(&fetcher), 0);

        pager.load_next().await;
        pager.load_previous().await;

        assert_eq!(pager.pages().len(), 1);
        assert_eq!(pager.pages()[0].prev_key, None);
        assert_eq!(pager.items().count(), 3);
        assert_eq!(fetcher.calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_later_page_keys() {
        let fetcher = Arc::new(FakeFetcher::new(5));
        let page = page_of(source(&fetcher).load(Some(4)).await);

        assert_eq!(page.prev_key, Some(3));
        assert_eq!(page.next_key, Some(5));
    }

    #[tokio::test]
    async fn test_empty_page_has_no_next_key() {
        let fetcher = Arc::new(FakeFetcher::new(2));
        let page = page_of(source(&fetcher).load(Some(3)).await);

        assert!(page.data.is_empty());
        assert_eq!(page.prev_key, Some(2));
        assert_eq!(page.next_key, None);
    }

    #[tokio::test]
    async fn test_overlay_applied_to_page() {
        let fetcher = Arc::new(FakeFetcher::new(1));
        let source = source(&fetcher).with_overlay(Arc::new(MarkEven));
        let page = page_of(source.load(None).await);

        let marks: Vec<bool> = page.data.iter().map(|item| item.marked).collect();
        assert_eq!(marks, vec![true, false, true]);
    }

    #[tokio::test]
    async fn test_failed_page_keeps_earlier_pages() {
        let fetcher = Arc::new(FakeFetcher::new(5));
        let mut pager = Pager::new(source(&fetcher));

        pager.load_next().await;
        pager.load_next().await;
        fetcher.fail_on(Some(3));

        let state = pager.load_next().await;
        match state {
            LoadState::Error(e) => assert_eq!(e.kind(), ErrorKind::ServerError),
            other => panic!("expected error, got {:?}", other),
        }
        assert_eq!(pager.pages().len(), 2);
        assert_eq!(pager.items().count(), 6);

        fetcher.fail_on(None);
        assert!(matches!(pager.retry().await, LoadState::Idle));
        assert_eq!(pager.pages().len(), 3);
        assert_eq!(pager.pages()[2].prev_key, Some(2));
        assert_eq!(fetcher.calls(), vec![1, 2, 3, 3]);
    }

    #[tokio::test]
    async fn test_end_reached_stops_loading() {
        let fetcher = Arc::new(FakeFetcher::new(1));
        let mut pager = Pager::new(source(&fetcher));

        assert!(matches!(pager.load_next().await, LoadState::Idle));
        assert!(matches!(pager.load_next().await, LoadState::EndReached));
        assert!(matches!(pager.load_next().await, LoadState::EndReached));
        assert_eq!(fetcher.calls(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_refresh_resumes_from_anchor_page() {
        let fetcher = Arc::new(FakeFetcher::new(5));
        let mut pager = Pager::new(source(&fetcher));
        for _ in 0..3 {
            pager.load_next().await;
        }

        // item 7 sits on page 3
        pager.refresh(Some(7)).await;
        assert_eq!(pager.pages().len(), 1);
        assert_eq!(pager.pages()[0].prev_key, Some(2));

        pager.load_previous().await;
        assert_eq!(pager.pages().len(), 2);
        assert_eq!(pager.items().next().map(|item| item.id), Some(3));
    }

    #[test]
    fn test_refresh_key_without_anchor() {
        let fetcher = Arc::new(FakeFetcher::new(5));
        let pages = vec![Page {
            data: vec![Item { id: 0, marked: false }],
            prev_key: None,
            next_key: Some(2),
        }];
        let source = source(&fetcher);

        let fresh = PagingState {
            pages: &pages,
            anchor_position: None,
        };
        assert_eq!(source.refresh_key(&fresh), None);

        let anchored = PagingState {
            pages: &pages,
            anchor_position: Some(0),
        };
        assert_eq!(source.refresh_key(&anchored), Some(1));
    }

    #[tokio::test]
    async fn test_stream_yields_pages_until_empty() {
        let fetcher = Arc::new(FakeFetcher::new(2));
        let pages: Vec<Vec<Item>> = Pager::new(source(&fetcher))
            .into_stream()
            .map(|page| page.unwrap())
            .collect()
            .await;

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1][0].id, 3);
    }
}
