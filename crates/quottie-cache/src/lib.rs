// SQLite-backed local store: bookmarks, the quote of the day and recent searches

pub mod bookmarks;
pub mod database;
pub mod entities;
pub mod error;
pub mod quote_of_the_day;
pub mod recent_search;

// Re-exported so callers can inspect raw SQLite failures
pub use rusqlite;

pub use bookmarks::{AuthorBookmarksDao, QuoteBookmarksDao};
pub use database::{Database, Table};
pub use entities::{AuthorEntity, QuoteEntity, QuoteOfTheDayEntity, RecentSearchQueryEntity};
pub use error::CacheError;
pub use quote_of_the_day::QuoteOfTheDayDao;
pub use recent_search::RecentSearchQueryDao;

pub type Result<T> = std::result::Result<T, CacheError>;
