use futures::stream::BoxStream;

use crate::preferences::{DarkThemeConfig, PreferencesDataSource, UserData};
use crate::Result;

#[derive(Clone)]
pub struct UserDataRepository {
    preferences: PreferencesDataSource,
}

impl UserDataRepository {
    pub fn new(preferences: PreferencesDataSource) -> Self {
        Self { preferences }
    }

    pub fn user_data(&self) -> BoxStream<'static, UserData> {
        self.preferences.user_data()
    }

    pub fn current(&self) -> UserData {
        self.preferences.current()
    }

    pub async fn set_should_hide_onboarding(&self, hide: bool) -> Result<()> {
        self.preferences.set_should_hide_onboarding(hide).await
    }

    pub async fn set_dark_theme_config(&self, config: DarkThemeConfig) -> Result<()> {
        self.preferences.set_dark_theme_config(config).await
    }

    /// Replace the stored usage total
    pub async fn update_total_usage_time(&self, total_ms: u64) -> Result<()> {
        self.preferences.update_total_usage_time(total_ms).await
    }

    /// Add `elapsed_ms` to the stored usage total
    pub async fn add_usage_time(&self, elapsed_ms: u64) -> Result<()> {
        self.preferences.add_usage_time(elapsed_ms).await
    }

    pub async fn set_review_shown(&self, shown: bool) -> Result<()> {
        self.preferences.set_review_shown(shown).await
    }
}
