//! Turns raw hits into client-facing search records.

use super::dsl::{DocField, EntityKind};
use super::gateway::{HitSet, RawHit};
use super::params::{PageLinks, PageRequest};
use super::scoring::HighlightPolicy;
use crate::uri;
use num_format::{Locale, ToFormattedString};
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Removes markup from a stored value.
pub fn strip_tags(value: &str) -> Cow<'_, str> {
    TAG.replace_all(value, "")
}

/// Thousands-separated hit count, e.g. `12,345`.
pub fn format_total(total: u64) -> String {
    total.to_formatted_string(&Locale::en)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageLink {
    pub uri: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicLink {
    pub uri: String,
    pub name: String,
    pub package_name: String,
    pub package_version: String,
}

/// Autocomplete payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuickSearchResults {
    pub packages: Vec<PackageLink>,
    pub topics: Vec<TopicLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HitFields {
    pub package_name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub fields: HitFields,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub score: Option<f64>,
    pub highlight: BTreeMap<String, Vec<String>>,
}

/// One page of keyword or full-text results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub total: String,
    pub hits: Vec<SearchHit>,
    pub per_page: u64,
    pub current_page: u64,
    pub prev_page_url: Option<String>,
    pub next_page_url: Option<String>,
}

/// Projection of raw hits, sanitizing highlight fragments down to the
/// configured highlight tags.
pub struct ResultProjector<'a> {
    highlight: &'a HighlightPolicy,
}

impl<'a> ResultProjector<'a> {
    pub const fn new(highlight: &'a HighlightPolicy) -> Self {
        Self { highlight }
    }

    /// Strips every tag except the highlight markers.
    pub fn sanitize_fragment<'f>(&self, fragment: &'f str) -> Cow<'f, str> {
        TAG.replace_all(fragment, |caps: &regex::Captures<'_>| {
            let tag = &caps[0];
            if tag == self.highlight.pre_tag || tag == self.highlight.post_tag {
                tag.to_string()
            } else {
                String::new()
            }
        })
    }

    pub fn quick(&self, packages: &HitSet, topics: &HitSet) -> QuickSearchResults {
        QuickSearchResults {
            packages: packages.hits.iter().filter_map(package_link).collect(),
            topics: topics.hits.iter().filter_map(topic_link).collect(),
        }
    }

    /// A package-version hit; name and label come from the hit itself.
    pub fn package_hit(&self, hit: &RawHit) -> Option<SearchHit> {
        let fields = HitFields {
            package_name: required(hit, hit, DocField::PackageName)?,
            version: required(hit, hit, DocField::Version)?,
            name: None,
        };
        Some(self.described_hit(hit, fields))
    }

    /// A topic hit; package name and label come from the owning version.
    pub fn topic_hit(&self, hit: &RawHit) -> Option<SearchHit> {
        let Some(version) = hit.inner_hit(EntityKind::PackageVersion.as_str()) else {
            tracing::warn!(id = %hit.id, "Skipping topic hit without owning version");
            return None;
        };

        let fields = HitFields {
            package_name: required(hit, version, DocField::PackageName)?,
            version: required(hit, version, DocField::Version)?,
            name: Some(required(hit, hit, DocField::Name)?),
        };
        Some(self.described_hit(hit, fields))
    }

    /// A keyword hit. Topic and keyword hits share one projection.
    pub fn keyword_hit(&self, hit: &RawHit) -> Option<SearchHit> {
        self.topic_hit(hit)
    }

    /// A hit whose highlight always carries title and description, falling
    /// back to the stored values when the backend highlighted neither.
    fn described_hit(&self, hit: &RawHit, fields: HitFields) -> SearchHit {
        let mut projected = self.search_hit(hit, fields);
        fill_highlight(&mut projected.highlight, hit, &[DocField::Title, DocField::Description]);
        projected
    }

    fn search_hit(&self, hit: &RawHit, fields: HitFields) -> SearchHit {
        SearchHit {
            fields,
            kind: hit.kind.clone(),
            score: hit.score,
            highlight: hit
                .highlight
                .iter()
                .map(|(field, fragments)| {
                    let fragments = fragments
                        .iter()
                        .map(|f| self.sanitize_fragment(f).into_owned())
                        .collect();
                    (field.clone(), fragments)
                })
                .collect(),
        }
    }

    /// A result page with its total and links.
    pub fn page(
        &self,
        hits: &HitSet,
        project: impl Fn(&Self, &RawHit) -> Option<SearchHit>,
        page: PageRequest,
        links: PageLinks,
    ) -> SearchPage {
        SearchPage {
            total: format_total(hits.total),
            hits: hits.hits.iter().filter_map(|hit| project(self, hit)).collect(),
            per_page: page.per_page,
            current_page: page.page,
            prev_page_url: links.prev,
            next_page_url: links.next,
        }
    }
}

/// Adds the stored value of each field the backend did not highlight.
fn fill_highlight(highlight: &mut BTreeMap<String, Vec<String>>, hit: &RawHit, fields: &[DocField]) {
    for field in fields {
        if highlight.contains_key(field.as_str()) {
            continue;
        }
        if let Some(value) = hit.field_str(field.as_str()) {
            highlight.insert(field.as_str().to_string(), vec![strip_tags(value).into_owned()]);
        }
    }
}

/// A projected string field from `source`, tags stripped. Logs and returns
/// `None` when missing so the whole hit is skipped.
fn required(hit: &RawHit, source: &RawHit, field: DocField) -> Option<String> {
    let value = source.field_str(field.as_str());
    if value.is_none() {
        tracing::warn!(id = %hit.id, field = field.as_str(), "Skipping hit without projected field");
    }
    value.map(|v| strip_tags(v).into_owned())
}

fn package_link(hit: &RawHit) -> Option<PackageLink> {
    let name = required(hit, hit, DocField::PackageName)?;
    let version = required(hit, hit, DocField::Version)?;
    Some(PackageLink {
        uri: uri::version_uri(&name, &version),
        name,
    })
}

fn topic_link(hit: &RawHit) -> Option<TopicLink> {
    let Some(version) = hit.inner_hit(EntityKind::PackageVersion.as_str()) else {
        tracing::warn!(id = %hit.id, "Skipping topic hit without owning version");
        return None;
    };
    let name = required(hit, hit, DocField::Name)?;
    let package_name = required(hit, version, DocField::PackageName)?;
    let package_version = required(hit, version, DocField::Version)?;

    Some(TopicLink {
        uri: uri::topic_uri(&package_name, &package_version, &name),
        name,
        package_name,
        package_version,
    })
}
