//! Shared test fixtures for integration tests.
//!
//! # Available Fixtures
//!
//! - `dplyr_store`: a `MemoryStore` seeded with three `dplyr` versions
//!   (`0.7.0`, `0.8.1`, `1.0.0`), a topic removed after `0.8.1`, an aliased
//!   topic, and the base package `base`.
//! - [`ScriptedBackend`]: a `SearchBackend` that records every request and
//!   answers from a responder closure.
//! - [`engine`]: an `Engine` over the given backend and store with an
//!   in-memory cache.

#![allow(dead_code)] // Fixtures are shared across integration test crates

use async_trait::async_trait;
use rdoc_search::cache::MemoryCacheStore;
use rdoc_search::error::{Backend, EngineError, Result};
use rdoc_search::model::{
    Argument, Package, PackageOverview, PackageVersion, Topic, TopicId, TopicRecord, VersionId,
};
use rdoc_search::resolve::{HrefRewriter, NoAssets};
use rdoc_search::search::dsl::SearchRequest;
use rdoc_search::search::{HitSet, SearchBackend};
use rdoc_search::store::{DocStore, MemoryStore, StoreSnapshot};
use rdoc_search::{Collaborators, Engine, config::EngineConfig};
use rstest::fixture;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

pub const BASE_URL: &str = "https://www.rdocumentation.org";

type Responder = Box<dyn Fn(&SearchRequest) -> Result<HitSet> + Send + Sync>;

/// Search backend answering from a closure and recording what it was asked.
pub struct ScriptedBackend {
    respond: Responder,
    requests: Mutex<Vec<SearchRequest>>,
    round_trips: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(respond: impl Fn(&SearchRequest) -> Result<HitSet> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            requests: Mutex::new(Vec::new()),
            round_trips: AtomicUsize::new(0),
        }
    }

    /// Answers every request with no hits.
    pub fn empty() -> Self {
        Self::new(|_| Ok(HitSet::default()))
    }

    /// Fails every request.
    pub fn failing() -> Self {
        Self::new(|_| Err(EngineError::backend(Backend::Search, "connection refused")))
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of `msearch` round trips made so far.
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }

    /// Request bodies as sent on the wire.
    pub fn request_bodies(&self) -> Vec<Value> {
        self.requests()
            .iter()
            .map(|r| serde_json::to_value(r).unwrap())
            .collect()
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn msearch(&self, requests: &[SearchRequest]) -> Result<Vec<HitSet>> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().extend(requests.iter().cloned());
        requests.iter().map(|r| (self.respond)(r)).collect()
    }
}

/// Store wrapper counting topic lookups.
pub struct CountingStore {
    inner: Arc<MemoryStore>,
    lookups: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocStore for CountingStore {
    async fn find_topics_by_name(&self, package: &str, name: &str) -> Result<Vec<TopicRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_topics_by_name(package, name).await
    }

    async fn find_topics_by_alias(&self, package: &str, alias: &str) -> Result<Vec<TopicRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_topics_by_alias(package, alias).await
    }

    async fn find_package_overview(&self, name: &str) -> Result<Option<PackageOverview>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_package_overview(name).await
    }

    async fn find_versions(&self, package: &str) -> Result<Vec<PackageVersion>> {
        self.inner.find_versions(package).await
    }
}

fn topic(id: u64, version: u64, name: &str) -> Topic {
    let mut topic = Topic::new(TopicId(id), VersionId(version), name);
    topic.title = Some(format!("{} (v{})", name, version));
    topic
}

/// The `dplyr` scenario plus the base package `base`.
pub fn dplyr_snapshot() -> StoreSnapshot {
    let mut versions = Vec::new();
    for (id, label, downloads) in [(1, "0.7.0", 1_000), (2, "0.8.1", 5_000), (3, "1.0.0", 900_000)] {
        let mut version = PackageVersion::new(VersionId(id), "dplyr", label);
        version.title = Some("A Grammar of Data Manipulation".into());
        version.description = format!("dplyr release {}", label);
        version.readme = Some("# dplyr".into());
        version.popularity.last_month_downloads = Some(downloads);
        versions.push(version);
    }

    let mut base = PackageVersion::new(VersionId(10), "base", "4.0.0");
    base.title = Some("The R Base Package".into());
    base.popularity.last_month_downloads = Some(10);
    base.popularity.part_of_base = Some(true);
    versions.push(base);

    let mut topics = Vec::new();
    for (id, version) in [(1, 1), (2, 2), (3, 3)] {
        let mut mutate = topic(id, version, "mutate");
        mutate.description = Some("Adds new variables".into());
        mutate.usage = Some("mutate(.data, ...)".into());
        mutate.arguments = vec![Argument {
            name: ".data".into(),
            description: "A data frame; see <a href=\"../topics/tbl_df\">tbl_df</a>".into(),
        }];
        mutate.examples = Some("  ".into());
        topics.push(mutate);
    }

    for (id, version) in [(4, 1), (5, 2)] {
        topics.push(topic(id, version, "some_removed_fn"));
    }

    let mut arrange = topic(6, 3, "arrange");
    arrange.aliases = vec!["arrange".into(), "arrange.data.frame".into()];
    arrange.details = Some("Sorts rows".into());
    topics.push(arrange);

    topics.push(topic(7, 10, "mean"));

    StoreSnapshot {
        packages: vec![Package::new("dplyr"), Package::new("base")],
        versions,
        topics,
    }
}

#[fixture]
pub fn dplyr_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::from_snapshot(dplyr_snapshot()))
}

/// Engine over `search` and `store` with default configuration, an
/// in-memory cache and link rewriting against [`BASE_URL`].
pub fn engine(search: Arc<dyn SearchBackend>, store: Arc<dyn DocStore>) -> Engine {
    Engine::new(
        EngineConfig::default(),
        Collaborators {
            search,
            store,
            cache: Arc::new(MemoryCacheStore::new(64)),
            links: Arc::new(HrefRewriter::new(Url::parse(BASE_URL).unwrap())),
            assets: Arc::new(NoAssets),
        },
    )
}

/// A package-version hit as projected by the backend.
pub fn package_hit(name: &str, version: &str, score: f64) -> Value {
    json!({
        "_id": format!("{}-{}", name, version),
        "_type": "package_version",
        "_score": score,
        "fields": { "package_name": [name], "version": [version] },
        "highlight": { "package_name": [format!("<mark>{}</mark>", name)] },
    })
}

/// A topic hit carrying its owning version as an inner hit.
pub fn topic_hit(name: &str, package: &str, version: &str, extra: Value) -> Value {
    let mut fields = json!({ "name": [name] });
    if let (Some(fields), Value::Object(extra)) = (fields.as_object_mut(), extra) {
        fields.extend(extra);
    }
    json!({
        "_id": format!("{}-{}-{}", package, version, name),
        "_type": "topic",
        "_score": 1.5,
        "fields": fields,
        "inner_hits": {
            "package_version": {
                "hits": {
                    "total": 1,
                    "hits": [{
                        "_id": format!("{}-{}", package, version),
                        "fields": {
                            "package_name": [package],
                            "version": [version],
                            "latest_version": [1],
                        },
                    }],
                },
            },
        },
    })
}

/// A hit set with the given total.
pub fn hit_set(total: u64, hits: Vec<Value>) -> HitSet {
    serde_json::from_value(json!({ "total": total, "hits": hits })).unwrap()
}
