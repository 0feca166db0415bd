//! Topics tagged with an exact keyword.

use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::search::{PageLinks, PageRequest, ResultProjector, SearchPage, SearchParams, search_one};
use rmcp::schemars;
use serde::Deserialize;

pub const KEYWORD: &str = "keyword";
pub const PAGE: &str = "page";
pub const DEFAULT_KEYWORD_PATH: &str = "/search_keyword";

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct KeywordSearchRequest {
    /// Request query string, e.g. "keyword=regression&page=2&perPage=20"
    pub query: String,
    /// Path that page links point at (default: /search_keyword)
    #[serde(default)]
    pub path: Option<String>,
}

pub async fn handle_keyword_search(engine: &Engine, request: KeywordSearchRequest) -> Result<SearchPage> {
    let params = SearchParams::parse(&request.query);
    let path = request.path.as_deref().unwrap_or(DEFAULT_KEYWORD_PATH);
    keyword_search(engine, &params, path).await
}

/// Keyword search over parsed parameters; page links reuse `params`.
pub async fn keyword_search(engine: &Engine, params: &SearchParams, path: &str) -> Result<SearchPage> {
    let keyword = params
        .non_blank(KEYWORD)
        .ok_or_else(|| EngineError::malformed("keyword is required"))?;
    let page = PageRequest::from_params(params, PAGE, engine.config().pagination);

    let hits = search_one(engine.search(), engine.queries().keyword(keyword, page.window())).await?;
    let links = PageLinks::build(path, params, PAGE, page, hits.total);

    Ok(engine.projector().page(&hits, ResultProjector::keyword_hit, page, links))
}
