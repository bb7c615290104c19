use chrono::{DateTime, Utc};
use quottie_api::{ListParams, NetworkAuthor, NetworkGithubUser, NetworkQuote};
use quottie_cache::{AuthorEntity, QuoteEntity, QuoteOfTheDayEntity, RecentSearchQueryEntity};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A quote as the app sees it
///
/// `is_bookmarked` is not part of the remote record. It is overlaid at read
/// time from the local bookmark table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub content: String,
    pub author: String,
    pub author_slug: String,
    pub length: u32,
    pub tags: Vec<String>,
    pub is_bookmarked: bool,
}

impl Quote {
    pub fn to_entity(&self, is_bookmarked: bool) -> QuoteEntity {
        QuoteEntity {
            id: self.id.clone(),
            content: self.content.clone(),
            author: self.author.clone(),
            author_slug: self.author_slug.clone(),
            length: self.length,
            tags: self.tags.clone(),
            is_bookmarked,
        }
    }

    pub fn to_quote_of_the_day(&self, fetched_at: DateTime<Utc>) -> QuoteOfTheDayEntity {
        QuoteOfTheDayEntity {
            id: self.id.clone(),
            content: self.content.clone(),
            author: self.author.clone(),
            author_slug: self.author_slug.clone(),
            length: self.length,
            tags: self.tags.clone(),
            last_fetched: fetched_at,
        }
    }
}

impl From<NetworkQuote> for Quote {
    fn from(quote: NetworkQuote) -> Self {
        Self {
            id: quote.id,
            content: quote.content,
            author: quote.author,
            author_slug: quote.author_slug,
            length: quote.length,
            tags: quote.tags,
            is_bookmarked: false,
        }
    }
}

impl From<QuoteEntity> for Quote {
    fn from(entity: QuoteEntity) -> Self {
        Self {
            id: entity.id,
            content: entity.content,
            author: entity.author,
            author_slug: entity.author_slug,
            length: entity.length,
            tags: entity.tags,
            is_bookmarked: entity.is_bookmarked,
        }
    }
}

impl From<QuoteOfTheDayEntity> for Quote {
    fn from(entity: QuoteOfTheDayEntity) -> Self {
        Self {
            id: entity.id,
            content: entity.content,
            author: entity.author,
            author_slug: entity.author_slug,
            length: entity.length,
            tags: entity.tags,
            is_bookmarked: false,
        }
    }
}

/// An author with a resolved portrait (empty when none was found)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub bio: String,
    pub description: String,
    /// Wiki page of the author; its last path segment is the wiki title
    pub link: String,
    pub quote_count: u32,
    pub image: String,
    pub is_bookmarked: bool,
}

impl Author {
    pub fn to_entity(&self, is_bookmarked: bool) -> AuthorEntity {
        AuthorEntity {
            id: self.id.clone(),
            name: self.name.clone(),
            slug: self.slug.clone(),
            bio: self.bio.clone(),
            description: self.description.clone(),
            link: self.link.clone(),
            quote_count: self.quote_count,
            image: self.image.clone(),
            is_bookmarked,
        }
    }
}

impl From<NetworkAuthor> for Author {
    fn from(author: NetworkAuthor) -> Self {
        Self {
            id: author.id,
            name: author.name,
            slug: author.slug,
            bio: author.bio,
            description: author.description,
            link: author.link,
            quote_count: author.quote_count,
            image: String::new(),
            is_bookmarked: false,
        }
    }
}

impl From<AuthorEntity> for Author {
    fn from(entity: AuthorEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            slug: entity.slug,
            bio: entity.bio,
            description: entity.description,
            link: entity.link,
            quote_count: entity.quote_count,
            image: entity.image,
            is_bookmarked: entity.is_bookmarked,
        }
    }
}

/// Field the backend sorts by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortField {
    #[default]
    DateAdded,
    DateModified,
    Author,
    Content,
    Name,
    QuoteCount,
}

impl SortField {
    pub fn as_param(self) -> &'static str {
        match self {
            SortField::DateAdded => "dateAdded",
            SortField::DateModified => "dateModified",
            SortField::Author => "author",
            SortField::Content => "content",
            SortField::Name => "name",
            SortField::QuoteCount => "quoteCount",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "dateadded" => Ok(SortField::DateAdded),
            "datemodified" => Ok(SortField::DateModified),
            "author" => Ok(SortField::Author),
            "content" => Ok(SortField::Content),
            "name" => Ok(SortField::Name),
            "quotecount" => Ok(SortField::QuoteCount),
            other => Err(format!("unknown sort field: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_param(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// Free-text query plus sorting, applied to a list or search read
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultFilter {
    pub query: String,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl ResultFilter {
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Which endpoint this filter should hit, and with what query text
    pub fn remote_query(&self) -> RemoteQuery {
        if self.query.is_empty() {
            RemoteQuery::List
        } else {
            RemoteQuery::Search(quote_numeric_query(&self.query))
        }
    }

    pub(crate) fn list_params(&self, slugs: &[String], page_size: u32, page: u32) -> ListParams {
        ListParams {
            sort_by: self.sort_field.as_param().to_string(),
            order: self.sort_order.as_param().to_string(),
            slugs: slugs.to_vec(),
            page_size,
            page,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteQuery {
    List,
    /// Search with the text exactly as it should go over the wire
    Search(String),
}

/// Wrap a numeric-looking query as `" <query> "` before it goes to the
/// search endpoint; a bare number is not treated as a text search there.
/// Anything else passes through untouched, including `nan` and `inf`.
pub fn quote_numeric_query(query: &str) -> String {
    if is_decimal_number(query) {
        format!("\" {} \"", query)
    } else {
        query.to_string()
    }
}

fn is_decimal_number(query: &str) -> bool {
    query
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
        && query.chars().any(|c| c.is_ascii_digit())
        && query.parse::<f64>().is_ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearchQuery {
    pub query: String,
    pub queried_date: DateTime<Utc>,
}

impl From<RecentSearchQueryEntity> for RecentSearchQuery {
    fn from(entity: RecentSearchQueryEntity) -> Self {
        Self {
            query: entity.query,
            queried_date: entity.queried_date,
        }
    }
}

/// The developer profile shown on the about screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubUser {
    pub login: String,
    /// Display name, or the login when the profile has none
    pub name: String,
    pub avatar_url: String,
    pub html_url: String,
    pub bio: String,
}

impl From<NetworkGithubUser> for GithubUser {
    fn from(user: NetworkGithubUser) -> Self {
        Self {
            name: user.name.unwrap_or_else(|| user.login.clone()),
            login: user.login,
            avatar_url: user.avatar_url,
            html_url: user.html_url,
            bio: user.bio.unwrap_or_default(),
        }
    }
}
