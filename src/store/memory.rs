use super::{DocStore, DocWriter};
use crate::error::Result;
use crate::model::{
    Package, PackageOverview, PackageVersion, Topic, TopicRecord, TopicSummary, VersionId,
};
use crate::version;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::RwLock;

/// Serialized store contents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreSnapshot {
    pub packages: Vec<Package>,
    pub versions: Vec<PackageVersion>,
    pub topics: Vec<Topic>,
}

#[derive(Debug, Default)]
struct Tables {
    packages: BTreeMap<String, Package>,
    versions: BTreeMap<VersionId, PackageVersion>,
    /// Insertion order is the storage order of lookups
    topics: Vec<Topic>,
}

impl Tables {
    fn record(&self, topic: &Topic, package: &str) -> Option<TopicRecord> {
        let version = self.versions.get(&topic.package_version_id)?;
        if version.package_name != package {
            return None;
        }
        Some(TopicRecord {
            topic: topic.clone(),
            version: version.clone(),
            package: self.packages.get(package)?.clone(),
        })
    }

    fn records(&self, package: &str, matches: impl Fn(&Topic) -> bool) -> Vec<TopicRecord> {
        self.topics
            .iter()
            .filter(|topic| matches(topic))
            .filter_map(|topic| self.record(topic, package))
            .collect()
    }

    fn next_version_id(&self) -> VersionId {
        VersionId(self.versions.keys().next_back().map_or(1, |id| id.0 + 1))
    }

    fn refresh_latest(&mut self, package: &str) -> Option<VersionId> {
        let candidates: Vec<&PackageVersion> = self
            .versions
            .values()
            .filter(|v| v.package_name == package)
            .collect();
        let latest = version::latest_by(candidates, |v| v.version.as_str()).map(|v| v.id);

        for version in self.versions.values_mut().filter(|v| v.package_name == package) {
            version.updated_at = None;
        }
        if let Some(entry) = self.packages.get_mut(package) {
            entry.latest_version_id = latest;
        }
        latest
    }
}

/// In-memory [`DocStore`] and [`DocWriter`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a snapshot and recomputes every package's latest
    /// version. Versions referencing unknown packages create them.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut tables = Tables::default();
        for package in snapshot.packages {
            tables.packages.insert(package.name.clone(), package);
        }
        for version in snapshot.versions {
            tables
                .packages
                .entry(version.package_name.clone())
                .or_insert_with(|| Package::new(version.package_name.clone()));
            tables.versions.insert(version.id, version);
        }
        tables.topics = snapshot.topics;

        let names: Vec<String> = tables.packages.keys().cloned().collect();
        for name in &names {
            tables.refresh_latest(name);
        }

        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Loads a JSON snapshot file.
    pub async fn load_snapshot(path: &Path) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read store snapshot {}", path.display()))?;
        let snapshot: StoreSnapshot = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse store snapshot {}", path.display()))?;

        tracing::info!(
            packages = snapshot.packages.len(),
            versions = snapshot.versions.len(),
            topics = snapshot.topics.len(),
            "Loaded store snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub async fn insert_topic(&self, topic: Topic) {
        let mut tables = self.tables.write().await;
        tables.topics.retain(|t| t.id != topic.id);
        tables.topics.push(topic);
    }

    pub async fn package(&self, name: &str) -> Option<Package> {
        self.tables.read().await.packages.get(name).cloned()
    }
}

#[async_trait]
impl DocStore for MemoryStore {
    async fn find_topics_by_name(&self, package: &str, name: &str) -> Result<Vec<TopicRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.records(package, |topic| topic.name == name))
    }

    async fn find_topics_by_alias(&self, package: &str, alias: &str) -> Result<Vec<TopicRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.records(package, |topic| topic.aliases.iter().any(|a| a == alias)))
    }

    async fn find_package_overview(&self, name: &str) -> Result<Option<PackageOverview>> {
        let tables = self.tables.read().await;
        let Some(package) = tables.packages.get(name) else {
            return Ok(None);
        };
        let Some(latest) = package
            .latest_version_id
            .and_then(|id| tables.versions.get(&id))
        else {
            return Ok(None);
        };

        let topics = tables
            .topics
            .iter()
            .filter(|t| t.package_version_id == latest.id)
            .map(|t| TopicSummary {
                id: t.id,
                name: t.name.clone(),
                title: t.title.clone(),
            })
            .collect();

        Ok(Some(PackageOverview {
            package: package.clone(),
            latest_version: latest.clone(),
            topics,
        }))
    }

    async fn find_versions(&self, package: &str) -> Result<Vec<PackageVersion>> {
        let tables = self.tables.read().await;
        Ok(tables
            .versions
            .values()
            .filter(|v| v.package_name == package)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DocWriter for MemoryStore {
    async fn upsert_package(&self, package: Package) -> Result<()> {
        let mut tables = self.tables.write().await;
        let previous = tables
            .packages
            .get(&package.name)
            .and_then(|p| p.latest_version_id);
        let latest_version_id = package.latest_version_id.or(previous);
        tables.packages.insert(
            package.name.clone(),
            Package {
                latest_version_id,
                ..package
            },
        );
        Ok(())
    }

    async fn upsert_version(&self, mut version: PackageVersion) -> Result<PackageVersion> {
        let mut tables = self.tables.write().await;
        tables
            .packages
            .entry(version.package_name.clone())
            .or_insert_with(|| Package::new(version.package_name.clone()));

        let existing = tables
            .versions
            .values()
            .find(|v| v.package_name == version.package_name && v.version == version.version)
            .map(|v| v.id);
        version.id = match existing {
            Some(id) => id,
            None if tables.versions.contains_key(&version.id) => tables.next_version_id(),
            None => version.id,
        };

        tables.versions.insert(version.id, version.clone());
        Ok(version)
    }

    async fn refresh_latest_version(&self, package: &str) -> Result<Option<VersionId>> {
        let latest = self.tables.write().await.refresh_latest(package);
        tracing::debug!(package, ?latest, "Refreshed latest version");
        Ok(latest)
    }
}
