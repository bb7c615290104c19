// Data layer for Quottie: error taxonomy and classification, domain models,
// paging, and the repositories that tie the remote and local sources together.

pub mod app;
pub mod classify;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod paging;
pub mod preferences;
pub mod repository;
pub mod wiki;

pub use app::AppContainer;
pub use clock::{Clock, SystemClock};
pub use config::{Config, ConfigError};
pub use error::{DataError, ErrorKind};
pub use models::{
    quote_numeric_query, Author, GithubUser, Quote, RecentSearchQuery, RemoteQuery, ResultFilter,
    SortField, SortOrder,
};
pub use paging::{
    BookmarkOverlay, LoadResult, LoadState, Page, PageFetcher, Pager, PagingSource, PagingState,
};
pub use preferences::{DarkThemeConfig, PreferencesDataSource, UserData};
pub use repository::{
    AuthorRepository, GithubUserRepository, QuoteRepository, SearchRepository, UserDataRepository,
};
pub use wiki::WikiResource;

/// Outcome of every data operation
pub type Result<T> = std::result::Result<T, DataError>;
