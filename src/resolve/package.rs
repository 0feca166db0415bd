use super::anchors::{Anchor, package_anchors};
use crate::error::{EngineError, Result};
use crate::model::PackageOverview;
use crate::store::DocStore;
use crate::uri;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Ancillary files stored next to a package version.
#[async_trait]
pub trait AssetCatalog: Send + Sync {
    /// Vignette object keys for one package version.
    async fn list_vignettes(&self, package: &str, version: &str) -> Result<Vec<String>>;
}

/// Catalog with no assets.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

#[async_trait]
impl AssetCatalog for NoAssets {
    async fn list_vignettes(&self, _package: &str, _version: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionLink {
    pub version: String,
    pub url: String,
}

/// Package widget payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageWidget {
    pub package_name: String,
    pub url: String,
    pub version: VersionLink,
    pub title: Option<String>,
    pub description: String,
    pub anchors: Vec<Anchor>,
}

pub struct PackageResolver {
    store: Arc<dyn DocStore>,
    assets: Arc<dyn AssetCatalog>,
}

impl PackageResolver {
    pub fn new(store: Arc<dyn DocStore>, assets: Arc<dyn AssetCatalog>) -> Self {
        Self { store, assets }
    }

    /// The package at its latest version, or [`EngineError::NotFound`]. The
    /// name is matched exactly.
    pub async fn overview(&self, package: &str) -> Result<PackageOverview> {
        self.store
            .find_package_overview(package)
            .await?
            .ok_or_else(|| EngineError::not_found(format!("package '{}'", package)))
    }

    pub async fn widget(&self, package: &str, base_url: &str) -> Result<PackageWidget> {
        let overview = self.overview(package).await?;
        let latest = &overview.latest_version;
        let vignettes = self
            .assets
            .list_vignettes(&latest.package_name, &latest.version)
            .await?;

        Ok(PackageWidget {
            package_name: overview.package.name.clone(),
            url: uri::absolute(base_url, &uri::package_uri(&overview.package.name)),
            version: VersionLink {
                version: latest.version.clone(),
                url: uri::absolute(base_url, &uri::version_uri(&latest.package_name, &latest.version)),
            },
            title: latest.title.clone(),
            description: latest.description.clone(),
            anchors: package_anchors(latest.readme.as_deref(), &overview.topics, &vignettes),
        })
    }

    /// Path of the package at its current latest version, the canonical page
    /// for any of its versions.
    pub async fn canonical_link(&self, package: &str) -> Result<Option<String>> {
        match self.overview(package).await {
            Ok(overview) => Ok(Some(uri::version_uri(
                &overview.latest_version.package_name,
                &overview.latest_version.version,
            ))),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}
