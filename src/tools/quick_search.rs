//! Autocomplete over package names and topic names/aliases.

use crate::engine::Engine;
use crate::error::{Backend, EngineError, Result};
use crate::search::QuickSearchResults;
use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QuickSearchRequest {
    /// Partial name typed so far, e.g. "dply" or "mea"
    pub token: String,
}

/// Runs the package and topic quick queries in one batched round trip.
pub async fn handle_quick_search(engine: &Engine, request: QuickSearchRequest) -> Result<QuickSearchResults> {
    let token = request.token.trim();
    if token.is_empty() {
        return Err(EngineError::malformed("token is required"));
    }

    let sets = engine.search().msearch(&engine.queries().quick(token)).await?;
    let [packages, topics] = <[_; 2]>::try_from(sets).map_err(|sets: Vec<_>| {
        EngineError::backend(
            Backend::Search,
            format!("expected 2 quick search results, got {}", sets.len()),
        )
    })?;

    Ok(engine.projector().quick(&packages, &topics))
}
