//! MCP tool server for Chroma.
//!
//! Spawned by an MCP client, it speaks JSON-RPC 2.0 over stdio. Logs go to
//! stderr and the rolling file under `{CHROMA_PERSIST_DIR}/logs`.
//!
//! Environment variables:
//! - `CHROMA_HOST`, `CHROMA_PORT` -- Chroma server address
//! - `CHROMA_PERSIST_DIR` -- local data and log directory
//! - `CHROMA_COLLECTION` -- default collection reported on `initialize`
//! - `CHROMA_EMBEDDING_URL`, `CHROMA_EMBEDDING_MODEL` -- embedding endpoint

use chroma_mcp_lib::config::ServerConfig;
use chroma_mcp_lib::dispatcher::Dispatcher;
use chroma_mcp_lib::mcp::server::McpServer;
use chroma_mcp_lib::services::logger;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[chroma-mcp] Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logger::init(&config.chroma.log_dir()) {
        eprintln!("[chroma-mcp] {}", e);
        std::process::exit(1);
    }

    let dispatcher = match Dispatcher::connect(&config).await {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            tracing::error!("Failed to initialize Chroma: {}", e);
            std::process::exit(1);
        }
    };

    let server = McpServer::new(dispatcher, config.collection_name.clone());
    if let Err(e) = server.run_stdio().await {
        tracing::error!("MCP server error: {}", e);
        std::process::exit(1);
    }
}
