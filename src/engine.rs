//! Process-wide collaborators, constructed once at startup and shared by
//! every request.

use crate::cache::{CacheAside, CacheStore, MemoryCacheStore, RedisCacheStore};
use crate::config::{CacheBackend, EngineConfig};
use crate::resolve::{
    AssetCatalog, HrefRewriter, LinkRewriter, NoAssets, PackageResolver, TopicResolver,
};
use crate::search::{ElasticsearchBackend, QueryBuilder, ResultProjector, SearchBackend};
use crate::store::{DocStore, MemoryStore};
use anyhow::Context;
use std::sync::Arc;
use url::Url;

/// External collaborators the engine is built from.
pub struct Collaborators {
    pub search: Arc<dyn SearchBackend>,
    pub store: Arc<dyn DocStore>,
    pub cache: Arc<dyn CacheStore>,
    pub links: Arc<dyn LinkRewriter>,
    pub assets: Arc<dyn AssetCatalog>,
}

pub struct Engine {
    config: EngineConfig,
    search: Arc<dyn SearchBackend>,
    cache: CacheAside,
    topics: TopicResolver,
    packages: PackageResolver,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(config: EngineConfig, parts: Collaborators) -> Self {
        Self {
            search: parts.search,
            cache: CacheAside::new(parts.cache),
            topics: TopicResolver::new(parts.store.clone(), parts.links),
            packages: PackageResolver::new(parts.store, parts.assets),
            config,
        }
    }

    /// Connects the configured search backend and cache store and loads the
    /// document store snapshot, if any.
    pub async fn from_config(config: EngineConfig) -> anyhow::Result<Self> {
        let search = ElasticsearchBackend::new(&config.search.url)
            .context("Failed to configure search backend")?;

        let cache: Arc<dyn CacheStore> = match config.cache.backend {
            CacheBackend::Memory => Arc::new(MemoryCacheStore::new(config.cache.capacity)),
            CacheBackend::Redis => Arc::new(
                RedisCacheStore::connect(&config.cache.redis_url)
                    .await
                    .context("Failed to connect to Redis cache")?,
            ),
        };

        let store = match config.snapshot_path() {
            Some(path) => MemoryStore::load_snapshot(&path).await?,
            None => {
                tracing::warn!("No store snapshot configured; widgets will resolve nothing");
                MemoryStore::new()
            }
        };

        let base = Url::parse(&config.site.base_url)
            .with_context(|| format!("Invalid site base URL '{}'", config.site.base_url))?;

        tracing::info!(
            search = %config.search.url,
            index = %config.search.index,
            cache = ?config.cache.backend,
            base_url = %config.site.base_url,
            "Engine configured"
        );

        Ok(Self::new(
            config,
            Collaborators {
                search: Arc::new(search),
                store: Arc::new(store),
                cache,
                links: Arc::new(HrefRewriter::new(base)),
                assets: Arc::new(NoAssets),
            },
        ))
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn search(&self) -> &dyn SearchBackend {
        self.search.as_ref()
    }

    pub const fn cache(&self) -> &CacheAside {
        &self.cache
    }

    pub const fn topics(&self) -> &TopicResolver {
        &self.topics
    }

    pub const fn packages(&self) -> &PackageResolver {
        &self.packages
    }

    pub fn queries(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.config.search.index, &self.config.ranking)
    }

    pub const fn projector(&self) -> ResultProjector<'_> {
        ResultProjector::new(&self.config.ranking.highlight)
    }

    pub fn base_url(&self) -> &str {
        &self.config.site.base_url
    }
}
