//! Server configuration.
//!
//! Every setting has a default and may be overridden by an environment
//! variable. The environment is read once, at startup.

mod schema;

pub use schema::{ChromaConfig, EmbeddingConfig, ServerConfig};

use std::path::PathBuf;

impl ServerConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = var("CHROMA_PERSIST_DIR") {
            config.chroma.persist_directory = PathBuf::from(dir);
        }
        if let Some(host) = var("CHROMA_HOST") {
            config.chroma.host = host;
        }
        if let Some(port) = var("CHROMA_PORT") {
            config.chroma.port = port
                .trim()
                .parse()
                .map_err(|e| format!("Invalid CHROMA_PORT '{}': {}", port, e))?;
        }
        if let Some(name) = var("CHROMA_COLLECTION") {
            config.collection_name = name;
        }
        if let Some(tenant) = var("CHROMA_TENANT") {
            config.chroma.tenant = tenant;
        }
        if let Some(database) = var("CHROMA_DATABASE") {
            config.chroma.database = database;
        }
        if let Some(flag) = var("CHROMA_ALLOW_RESET") {
            config.chroma.allow_reset = parse_flag("CHROMA_ALLOW_RESET", &flag)?;
        }
        if let Some(flag) = var("CHROMA_RESET_ON_START") {
            config.chroma.reset_on_start = parse_flag("CHROMA_RESET_ON_START", &flag)?;
        }
        if let Some(url) = var("CHROMA_EMBEDDING_URL") {
            config.embedding.base_url = url;
        }
        if let Some(model) = var("CHROMA_EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        config.embedding.api_key = var("CHROMA_EMBEDDING_API_KEY");

        Ok(config)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("Invalid {} '{}': expected true or false", key, other)),
    }
}
