//! MCP server exposing the search and widget tools.

use crate::engine::Engine;
use crate::schema::inline_schema_for_type;
use crate::tools::{
    FullSearchRequest, KeywordSearchRequest, PackageWidgetRequest, QuickSearchRequest,
    TopicWidgetRequest, handle_full_search, handle_keyword_search, handle_package_widget,
    handle_quick_search, handle_topic_widget, to_json, widget_json,
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP Server for package documentation search
#[derive(Clone)]
pub struct SearchServer {
    /// Shared collaborators (search backend, store, cache)
    engine: Arc<Engine>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for SearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchServer")
            .field("engine", &self.engine)
            .finish()
    }
}

/// Logs a failed tool call and turns it into the tool error text.
fn tool_error(tool: &str, err: &crate::error::EngineError) -> String {
    match err {
        crate::error::EngineError::MalformedInput(_) => tracing::debug!(tool, "{}", err),
        _ => tracing::error!(tool, "{}", err),
    }
    err.to_string()
}

#[tool_router]
impl SearchServer {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    #[tool(
        description = "Autocomplete package and topic names. Returns up to five packages (latest versions, most downloaded first) and five topics, each with its documentation URL.",
        input_schema = inline_schema_for_type::<QuickSearchRequest>()
    )]
    async fn quick_search(
        &self,
        Parameters(request): Parameters<QuickSearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_quick_search(&self.engine, request)
            .await
            .and_then(|results| to_json(&results))
            .map_err(|e| tool_error("quick_search", &e))
    }

    #[tool(
        description = "Find topics tagged with an exact keyword in the latest version of each package. Takes the request query string (keyword, page, perPage) and returns one page of results with prev/next page links.",
        input_schema = inline_schema_for_type::<KeywordSearchRequest>()
    )]
    async fn keyword_search(
        &self,
        Parameters(request): Parameters<KeywordSearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_keyword_search(&self.engine, request)
            .await
            .and_then(|page| to_json(&page))
            .map_err(|e| tool_error("keyword_search", &e))
    }

    #[tool(
        description = "Full-text search over packages and topics, ranked by relevance and popularity. Takes the request query string (q, ppage, fpage, perPage); packages and topics are paged independently.",
        input_schema = inline_schema_for_type::<FullSearchRequest>()
    )]
    async fn full_search(
        &self,
        Parameters(request): Parameters<FullSearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_full_search(&self.engine, request)
            .await
            .and_then(|results| to_json(&results))
            .map_err(|e| tool_error("full_search", &e))
    }

    #[tool(
        description = "Summary of a topic from the highest package version that documents it: title, description, URLs and section anchors. Aliases are accepted. Returns {} when the topic does not exist.",
        input_schema = inline_schema_for_type::<TopicWidgetRequest>()
    )]
    async fn topic_widget(
        &self,
        Parameters(request): Parameters<TopicWidgetRequest>,
    ) -> std::result::Result<String, String> {
        handle_topic_widget(&self.engine, request)
            .await
            .and_then(|widget| widget_json(widget.as_ref()))
            .map_err(|e| tool_error("topic_widget", &e))
    }

    #[tool(
        description = "Summary of a package at its latest version: title, description, URLs and page anchors. Returns {} when the package does not exist.",
        input_schema = inline_schema_for_type::<PackageWidgetRequest>()
    )]
    async fn package_widget(
        &self,
        Parameters(request): Parameters<PackageWidgetRequest>,
    ) -> std::result::Result<String, String> {
        handle_package_widget(&self.engine, request)
            .await
            .and_then(|widget| widget_json(widget.as_ref()))
            .map_err(|e| tool_error("package_widget", &e))
    }
}

#[tool_handler]
impl ServerHandler for SearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "rdoc-search: search and summarize R package documentation. \
                 Use quick_search for autocomplete, full_search or keyword_search for result pages, \
                 and topic_widget/package_widget for embeddable summaries.",
            )
    }
}
