//! Structured documentation store.
//!
//! [`DocStore`] covers the reads the resolvers need; [`DocWriter`] covers
//! ingestion and latest-version maintenance. [`MemoryStore`] implements both.

mod memory;

pub use memory::{MemoryStore, StoreSnapshot};

use crate::error::Result;
use crate::model::{Package, PackageOverview, PackageVersion, TopicRecord, VersionId};
use async_trait::async_trait;

#[async_trait]
pub trait DocStore: Send + Sync {
    /// Topics named `name` in any version of `package`, with their version
    /// and package loaded.
    async fn find_topics_by_name(&self, package: &str, name: &str) -> Result<Vec<TopicRecord>>;

    /// Topics in any version of `package` listing `alias` among their aliases.
    async fn find_topics_by_alias(&self, package: &str, alias: &str) -> Result<Vec<TopicRecord>>;

    /// The package with its latest version and that version's topics.
    async fn find_package_overview(&self, name: &str) -> Result<Option<PackageOverview>>;

    /// Every version of `package`, in storage order.
    async fn find_versions(&self, package: &str) -> Result<Vec<PackageVersion>>;
}

#[async_trait]
pub trait DocWriter: Send + Sync {
    /// Inserts or replaces a package by name. An existing latest-version
    /// reference is kept when the incoming one is unset.
    async fn upsert_package(&self, package: Package) -> Result<()>;

    /// Inserts or replaces the version for `(package_name, version)`, creating
    /// the package if needed. A replaced version keeps its stored id.
    async fn upsert_version(&self, version: PackageVersion) -> Result<PackageVersion>;

    /// Points the package at its highest version and resets `updated_at` on
    /// all of its versions. Returns the new latest id.
    async fn refresh_latest_version(&self, package: &str) -> Result<Option<VersionId>>;

    /// Upserts a version, then refreshes the package's latest version.
    async fn ingest_version(&self, version: PackageVersion) -> Result<PackageVersion> {
        let stored = self.upsert_version(version).await?;
        self.refresh_latest_version(&stored.package_name).await?;
        Ok(stored)
    }
}
