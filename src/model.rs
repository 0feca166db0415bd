//! Packages, versions, topics and their child collections.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Identifier of a stored [`PackageVersion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(pub u64);

/// Identifier of a stored [`Topic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(pub u64);

/// Identifier of a package maintainer or collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollaboratorId(pub u64);

/// A package, identified by its case-sensitive name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    /// Repository classification ("cran", "bioconductor", "github", ...)
    #[serde(default)]
    pub repository: Option<String>,
    /// Always the value-maximal version of this package once any version exists
    #[serde(default)]
    pub latest_version_id: Option<VersionId>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repository: None,
            latest_version_id: None,
        }
    }
}

/// Download-based popularity plus the base-distribution category flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularitySignal {
    pub last_month_downloads: Option<u64>,
    /// `Some(true)` for packages shipped with the base distribution
    pub part_of_base: Option<bool>,
}

/// One released version of a package; unique per (package_name, version).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageVersion {
    pub id: VersionId,
    pub package_name: String,
    pub version: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(default)]
    pub readme: Option<String>,
    #[serde(default)]
    pub maintainer_id: Option<CollaboratorId>,
    #[serde(default)]
    pub collaborator_ids: Vec<CollaboratorId>,
    #[serde(default)]
    pub popularity: PopularitySignal,
    /// Reset to `None` whenever the package's latest version is recomputed
    #[serde(default)]
    pub updated_at: Option<SystemTime>,
}

impl PackageVersion {
    pub fn new(id: VersionId, package_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id,
            package_name: package_name.into(),
            version: version.into(),
            title: None,
            description: String::new(),
            release_date: None,
            license: String::new(),
            url: None,
            copyright: None,
            readme: None,
            maintainer_id: None,
            collaborator_ids: Vec::new(),
            popularity: PopularitySignal::default(),
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A documented function or topic inside one package version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub package_version_id: VersionId,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub references: Option<String>,
    #[serde(default)]
    pub see_also: Option<String>,
    #[serde(default)]
    pub examples: Option<String>,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Topic {
    pub fn new(id: TopicId, package_version_id: VersionId, name: impl Into<String>) -> Self {
        Self {
            id,
            package_version_id,
            name: name.into(),
            title: None,
            description: None,
            usage: None,
            details: None,
            value: None,
            note: None,
            references: None,
            see_also: None,
            examples: None,
            arguments: Vec::new(),
            sections: Vec::new(),
            aliases: Vec::new(),
            keywords: Vec::new(),
        }
    }

    /// Mutable access to every free-text field, for link rewriting.
    pub fn text_fields_mut(&mut self) -> impl Iterator<Item = &mut String> {
        [
            &mut self.description,
            &mut self.usage,
            &mut self.details,
            &mut self.value,
            &mut self.note,
            &mut self.references,
            &mut self.see_also,
            &mut self.examples,
        ]
        .into_iter()
        .flatten()
        .chain(self.arguments.iter_mut().map(|a| &mut a.description))
        .chain(self.sections.iter_mut().map(|s| &mut s.description))
    }
}

/// A topic with its owning version and package loaded eagerly.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicRecord {
    pub topic: Topic,
    pub version: PackageVersion,
    pub package: Package,
}

/// Short topic listing attached to a package overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicSummary {
    pub id: TopicId,
    pub name: String,
    pub title: Option<String>,
}

/// A package with its latest version and that version's topics.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageOverview {
    pub package: Package,
    pub latest_version: PackageVersion,
    pub topics: Vec<TopicSummary>,
}
