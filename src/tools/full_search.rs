//! Full-text relevance search over packages and topics.

use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::search::{PageLinks, PageRequest, ResultProjector, SearchPage, SearchParams, search_one};
use rmcp::schemars;
use serde::{Deserialize, Serialize};

pub const QUERY: &str = "q";
pub const PACKAGE_PAGE: &str = "ppage";
pub const TOPIC_PAGE: &str = "fpage";
pub const DEFAULT_SEARCH_PATH: &str = "/search";

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FullSearchRequest {
    /// Request query string, e.g. "q=tidy+data&ppage=1&fpage=3&perPage=10"
    pub query: String,
    /// Path that page links point at (default: /search)
    #[serde(default)]
    pub path: Option<String>,
}

/// Package and topic result pages, each with its own cursor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullSearchResults {
    pub packages: SearchPage,
    pub topics: SearchPage,
}

pub async fn handle_full_search(engine: &Engine, request: FullSearchRequest) -> Result<FullSearchResults> {
    let params = SearchParams::parse(&request.query);
    let path = request.path.as_deref().unwrap_or(DEFAULT_SEARCH_PATH);
    full_search(engine, &params, path).await
}

/// Runs both relevance searches concurrently. Either failing fails the whole
/// search.
pub async fn full_search(engine: &Engine, params: &SearchParams, path: &str) -> Result<FullSearchResults> {
    let text = params
        .non_blank(QUERY)
        .ok_or_else(|| EngineError::malformed("q is required"))?;
    let limits = engine.config().pagination;
    let package_page = PageRequest::from_params(params, PACKAGE_PAGE, limits);
    let topic_page = PageRequest::from_params(params, TOPIC_PAGE, limits);

    let queries = engine.queries();
    let (packages, topics) = tokio::try_join!(
        search_one(engine.search(), queries.package_relevance(text, package_page.window())),
        search_one(engine.search(), queries.topic_relevance(text, topic_page.window())),
    )?;

    let projector = engine.projector();
    Ok(FullSearchResults {
        packages: projector.page(
            &packages,
            ResultProjector::package_hit,
            package_page,
            PageLinks::build(path, params, PACKAGE_PAGE, package_page, packages.total),
        ),
        topics: projector.page(
            &topics,
            ResultProjector::topic_hit,
            topic_page,
            PageLinks::build(path, params, TOPIC_PAGE, topic_page, topics.total),
        ),
    })
}
