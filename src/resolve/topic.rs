use super::anchors::{Anchor, topic_anchors};
use super::links::LinkRewriter;
use crate::error::{EngineError, Result};
use crate::model::TopicRecord;
use crate::store::DocStore;
use crate::uri;
use crate::version;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Version block embedded in the topic widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRef {
    pub package_name: String,
    pub version: String,
    pub url: String,
}

/// Topic widget payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicWidget {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub package_version: VersionRef,
    pub anchors: Vec<Anchor>,
}

/// Resolves `(package, topic)` to the topic's entry in the highest version
/// of the package that documents it.
pub struct TopicResolver {
    store: Arc<dyn DocStore>,
    links: Arc<dyn LinkRewriter>,
}

impl TopicResolver {
    pub fn new(store: Arc<dyn DocStore>, links: Arc<dyn LinkRewriter>) -> Self {
        Self { store, links }
    }

    /// Looks the topic up by name, then by alias, and keeps the match from
    /// the highest version. Links in the result are rewritten. `name` is
    /// matched as given; callers strip page suffixes first.
    ///
    /// Zero matches is [`EngineError::NotFound`]; store failures pass through.
    pub async fn resolve(&self, package: &str, name: &str) -> Result<TopicRecord> {
        let mut matches = self.store.find_topics_by_name(package, name).await?;
        if matches.is_empty() {
            tracing::debug!(package, topic = name, "No topic by name, trying aliases");
            matches = self.store.find_topics_by_alias(package, name).await?;
        }

        let mut canonical = version::latest_by(matches, |record| record.version.version.as_str())
            .ok_or_else(|| EngineError::not_found(format!("topic '{}' in package '{}'", name, package)))?;

        canonical.topic = self.links.rewrite(canonical.topic);
        Ok(canonical)
    }

    /// Resolves and renders the widget payload with absolute URLs.
    pub async fn widget(&self, package: &str, topic: &str, base_url: &str) -> Result<TopicWidget> {
        let record = self.resolve(package, topic).await?;
        Ok(render_widget(&record, base_url))
    }
}

pub fn render_widget(record: &TopicRecord, base_url: &str) -> TopicWidget {
    let TopicRecord { topic, version, .. } = record;
    let version_path = uri::version_uri(&version.package_name, &version.version);

    TopicWidget {
        name: topic.name.clone(),
        title: topic.title.clone(),
        description: topic.description.clone(),
        url: uri::absolute(
            base_url,
            &uri::topic_uri(&version.package_name, &version.version, &topic.name),
        ),
        package_version: VersionRef {
            package_name: version.package_name.clone(),
            version: version.version.clone(),
            url: uri::absolute(base_url, &version_path),
        },
        anchors: topic_anchors(topic),
    }
}
