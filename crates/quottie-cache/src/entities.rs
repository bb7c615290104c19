// Row types for the local tables
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `quote_bookmarks` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteEntity {
    pub id: String,
    pub content: String,
    pub author: String,
    pub author_slug: String,
    pub length: u32,
    pub tags: Vec<String>,
    pub is_bookmarked: bool,
}

/// `author_bookmarks` row. The image is stored already resolved, so a
/// bookmarked author never needs the wiki lookup again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorEntity {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub bio: String,
    pub description: String,
    pub link: String,
    pub quote_count: u32,
    pub image: String,
    pub is_bookmarked: bool,
}

/// The single cached `quote_of_the_day` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteOfTheDayEntity {
    pub id: String,
    pub content: String,
    pub author: String,
    pub author_slug: String,
    pub length: u32,
    pub tags: Vec<String>,
    pub last_fetched: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearchQueryEntity {
    pub query: String,
    pub queried_date: DateTime<Utc>,
}
