//! Chroma collection operations served over two stdio transports: MCP
//! JSON-RPC tool calls (`chroma-mcp`) and a raw line-delimited JSON loop
//! (`chroma-mcp-stdio`).

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod mcp;
pub mod raw;
pub mod services;
pub mod store;
pub mod transport;
