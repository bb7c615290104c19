use quottie_api::{
    GithubClient, GithubDataSource, QuotableClient, QuotesDataSource, WikiDataSource,
    WikipediaClient,
};
use quottie_cache::{
    AuthorBookmarksDao, Database, QuoteBookmarksDao, QuoteOfTheDayDao, RecentSearchQueryDao,
};
use std::sync::Arc;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::{Config, ConfigError};
use crate::preferences::PreferencesDataSource;
use crate::repository::{
    AuthorRepository, GithubUserRepository, QuoteRepository, SearchRepository, UserDataRepository,
};

/// Every repository, wired to one database and one set of remote clients
#[derive(Clone)]
pub struct AppContainer {
    pub quotes: QuoteRepository,
    pub authors: AuthorRepository,
    pub search: SearchRepository,
    pub user_data: UserDataRepository,
    pub github_user: GithubUserRepository,
}

impl AppContainer {
    /// Open the local store and preferences named by `config` and build
    /// HTTP clients against its base URLs
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let database_path = config.storage.database_path()?;
        info!(path = %database_path.display(), "Opening local store");
        let db = Database::open(&database_path)?;
        let preferences = PreferencesDataSource::open(config.storage.preferences_path()?)?;

        let quotes = Arc::new(QuotableClient::with_base_url(config.network.quotes_url.clone()));
        let wiki = Arc::new(
            WikipediaClient::with_base_url(config.network.wiki_url.clone())
                .with_thumbnail_size(config.network.thumbnail_size),
        );

        let github = Arc::new(
            GithubClient::with_base_url(config.network.github_url.clone())
                .with_login(config.network.github_login.clone()),
        );

        Ok(Self::with_parts(
            db,
            preferences,
            quotes,
            wiki,
            github,
            Arc::new(SystemClock),
        ))
    }

    pub fn with_parts(
        db: Database,
        preferences: PreferencesDataSource,
        quotes: Arc<dyn QuotesDataSource>,
        wiki: Arc<dyn WikiDataSource>,
        github: Arc<dyn GithubDataSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            quotes: QuoteRepository::new(
                Arc::clone(&quotes),
                QuoteBookmarksDao::new(db.clone()),
                QuoteOfTheDayDao::new(db.clone()),
            )
            .with_clock(Arc::clone(&clock)),
            authors: AuthorRepository::new(quotes, wiki, AuthorBookmarksDao::new(db.clone())),
            search: SearchRepository::new(RecentSearchQueryDao::new(db)).with_clock(clock),
            user_data: UserDataRepository::new(preferences),
            github_user: GithubUserRepository::new(github),
        }
    }
}
