//! Engine configuration loaded from TOML with environment overrides.

use crate::search::{Pagination, RankingPolicy};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "RDOC_SEARCH_CONFIG";
pub const SEARCH_URL_ENV: &str = "RDOC_SEARCH_URL";
pub const REDIS_URL_ENV: &str = "RDOC_REDIS_URL";
pub const BASE_URL_ENV: &str = "RDOC_BASE_URL";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub url: String,
    pub index: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            index: "rdoc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub redis_url: String,
    /// Entry limit of the in-memory store
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.rdocumentation.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON snapshot loaded into the in-memory store at startup
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchConfig,
    pub cache: CacheConfig,
    pub site: SiteConfig,
    pub store: StoreConfig,
    pub pagination: Pagination,
    pub ranking: RankingPolicy,
}

impl EngineConfig {
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Invalid engine configuration")
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("In config file {}", path.display()))
    }

    /// Loads the first config found: `explicit`, then `$RDOC_SEARCH_CONFIG`,
    /// then `<config dir>/rdoc-search/config.toml`. Falls back to defaults.
    /// Environment overrides are applied last.
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let mut config = if let Some(path) = explicit.map(Path::to_path_buf).or(env_path) {
            Self::from_file(&path).await?
        } else {
            match default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path).await?,
                None => Self::default(),
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies `RDOC_*` overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_blank(SEARCH_URL_ENV) {
            self.search.url = url;
        }
        if let Some(url) = non_blank(REDIS_URL_ENV) {
            self.cache.redis_url = url;
            self.cache.backend = CacheBackend::Redis;
        }
        if let Some(url) = non_blank(BASE_URL_ENV) {
            self.site.base_url = url;
        }
    }

    /// Snapshot path with a leading `~` expanded.
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        let path = self.store.snapshot_path.as_ref()?;
        Some(PathBuf::from(expand_tilde(&path.to_string_lossy()).into_owned()))
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rdoc-search").join("config.toml"))
}

/// Expands a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
