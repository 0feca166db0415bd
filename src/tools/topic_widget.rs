//! Embeddable summary of one topic.

use crate::cache::{TtlClass, topic_widget_key};
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::resolve::{TopicWidget, normalize_name};
use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TopicWidgetRequest {
    /// Package name, e.g. "dplyr"
    pub package: String,
    /// Topic or alias name, e.g. "mutate" (a trailing ".html" is ignored)
    pub topic: String,
}

/// The widget for the topic's highest documenting version, or `None` when
/// the topic does not exist. Both outcomes are cached daily.
pub async fn handle_topic_widget(engine: &Engine, request: TopicWidgetRequest) -> Result<Option<TopicWidget>> {
    let package = request.package.trim();
    let topic = normalize_name(request.topic.trim());
    if package.is_empty() || topic.is_empty() {
        return Err(EngineError::malformed("package and topic are required"));
    }

    let key = topic_widget_key(package, topic);
    super::found(
        engine
            .cache()
            .get_or_compute(&key, TtlClass::Daily, || {
                engine.topics().widget(package, topic, engine.base_url())
            })
            .await,
    )
}
