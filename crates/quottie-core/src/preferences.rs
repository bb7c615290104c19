// User preferences: a small record persisted as JSON and observed as a stream.
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::{DataError, ErrorKind, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DarkThemeConfig {
    #[default]
    FollowSystem,
    Light,
    Dark,
}

impl fmt::Display for DarkThemeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DarkThemeConfig::FollowSystem => "follow-system",
            DarkThemeConfig::Light => "light",
            DarkThemeConfig::Dark => "dark",
        })
    }
}

impl FromStr for DarkThemeConfig {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "follow-system" | "follow_system" | "system" => Ok(DarkThemeConfig::FollowSystem),
            "light" => Ok(DarkThemeConfig::Light),
            "dark" => Ok(DarkThemeConfig::Dark),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserData {
    pub should_hide_onboarding: bool,
    pub dark_theme_config: DarkThemeConfig,
    /// Cumulative time the app has been in use, in milliseconds
    pub total_usage_time_ms: u64,
    pub is_review_shown: bool,
}

struct Inner {
    /// `None` keeps everything in memory
    path: Option<PathBuf>,
    state: watch::Sender<UserData>,
    write_lock: Mutex<()>,
}

/// Preference store. Writes are serialized and hit disk before observers
/// see the new value.
#[derive(Clone)]
pub struct PreferencesDataSource {
    inner: Arc<Inner>,
}

impl PreferencesDataSource {
    /// Load preferences from `path`; a missing file means defaults
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let contents =
                std::fs::read_to_string(&path).map_err(|e| DataError::new(ErrorKind::Unknown, e))?;
            serde_json::from_str(&contents)
                .map_err(|e| DataError::new(ErrorKind::Serialization, e))?
        } else {
            UserData::default()
        };
        debug!(path = %path.display(), "Loaded preferences");
        Ok(Self::build(Some(path), data))
    }

    pub fn in_memory() -> Self {
        Self::build(None, UserData::default())
    }

    fn build(path: Option<PathBuf>, data: UserData) -> Self {
        let (state, _) = watch::channel(data);
        Self {
            inner: Arc::new(Inner {
                path,
                state,
                write_lock: Mutex::new(()),
            }),
        }
    }

    pub fn current(&self) -> UserData {
        self.inner.state.borrow().clone()
    }

    /// Current preferences, then every subsequent change
    pub fn user_data(&self) -> BoxStream<'static, UserData> {
        let receiver = self.inner.state.subscribe();
        stream::unfold((receiver, true), |(mut receiver, first)| async move {
            if !first && receiver.changed().await.is_err() {
                return None;
            }
            let value = receiver.borrow_and_update().clone();
            Some((value, (receiver, false)))
        })
        .boxed()
    }

    pub async fn set_should_hide_onboarding(&self, hide: bool) -> Result<()> {
        self.update(|data| data.should_hide_onboarding = hide).await
    }

    pub async fn set_dark_theme_config(&self, config: DarkThemeConfig) -> Result<()> {
        self.update(|data| data.dark_theme_config = config).await
    }

    pub async fn update_total_usage_time(&self, total_ms: u64) -> Result<()> {
        self.update(|data| data.total_usage_time_ms = total_ms).await
    }

    /// Add `elapsed_ms` to the stored total under the write lock
    pub async fn add_usage_time(&self, elapsed_ms: u64) -> Result<()> {
        self.update(|data| {
            data.total_usage_time_ms = data.total_usage_time_ms.saturating_add(elapsed_ms)
        })
        .await
    }

    pub async fn set_review_shown(&self, shown: bool) -> Result<()> {
        self.update(|data| data.is_review_shown = shown).await
    }

    async fn update(&self, change: impl FnOnce(&mut UserData)) -> Result<()> {
        let _guard = self.inner.write_lock.lock().await;

        let mut next = self.current();
        change(&mut next);
        if let Some(path) = &self.inner.path {
            persist(path, &next).await?;
        }
        self.inner.state.send_replace(next);
        Ok(())
    }
}

/// Write to a sibling temp file and rename over the target
async fn persist(path: &Path, data: &UserData) -> Result<()> {
    let io_error = |e: std::io::Error| DataError::new(ErrorKind::Unknown, e);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    let contents = serde_json::to_string_pretty(data)
        .map_err(|e| DataError::new(ErrorKind::Serialization, e))?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, contents).await.map_err(io_error)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_error)?;
    Ok(())
}
