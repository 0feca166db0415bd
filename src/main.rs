use rdoc_search::config::EngineConfig;
use rdoc_search::engine::Engine;
use rdoc_search::server::SearchServer;
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rdoc_search::tracing::init();

    tracing::info!("Starting rdoc-search MCP server");

    // Optional first argument: config file path
    let explicit = std::env::args_os().nth(1).map(PathBuf::from);
    let config = EngineConfig::load(explicit.as_deref()).await?;
    let engine = Engine::from_config(config).await?;

    let server = SearchServer::new(Arc::new(engine));
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;

    Ok(())
}
