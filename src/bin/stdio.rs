//! Raw line-delimited JSON server for Chroma.
//!
//! Reads `{"method": ..., "params": {...}}` per stdin line and writes one
//! response envelope per stdout line. Same configuration as `chroma-mcp`.

use tokio::io::BufReader;

use chroma_mcp_lib::config::ServerConfig;
use chroma_mcp_lib::dispatcher::Dispatcher;
use chroma_mcp_lib::raw;
use chroma_mcp_lib::services::logger;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[chroma-mcp-stdio] Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logger::init(&config.chroma.log_dir()) {
        eprintln!("[chroma-mcp-stdio] {}", e);
        std::process::exit(1);
    }

    let dispatcher = match Dispatcher::connect(&config).await {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            tracing::error!("Failed to initialize Chroma: {}", e);
            std::process::exit(1);
        }
    };

    let reader = BufReader::new(tokio::io::stdin());
    if let Err(e) = raw::run(&dispatcher, reader, tokio::io::stdout()).await {
        tracing::error!("Stdio loop error: {}", e);
        std::process::exit(1);
    }
}
