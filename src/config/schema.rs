use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for both server binaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default)]
    pub chroma: ChromaConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Collection name reported to clients as the suggested default.
    #[serde(default = "default_collection")]
    pub collection_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            chroma: ChromaConfig::default(),
            embedding: EmbeddingConfig::default(),
            collection_name: default_collection(),
        }
    }
}

/// Chroma connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromaConfig {
    #[serde(default = "default_persist_directory")]
    pub persist_directory: PathBuf,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_tenant")]
    pub tenant: String,
    #[serde(default = "default_database")]
    pub database: String,
    /// Never sent anywhere; kept so the effective settings show up in logs.
    #[serde(default)]
    pub anonymized_telemetry: bool,
    #[serde(default = "default_true")]
    pub allow_reset: bool,
    #[serde(default)]
    pub reset_on_start: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ChromaConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Directory for rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.persist_directory.join("logs")
    }
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            persist_directory: default_persist_directory(),
            host: default_host(),
            port: default_port(),
            tenant: default_tenant(),
            database: default_database(),
            anonymized_telemetry: false,
            allow_reset: true,
            reset_on_start: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// OpenAI-compatible embedding endpoint used to vectorize documents and queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_url")]
    pub base_url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_embedding_url(),
            model: default_embedding_model(),
            api_key: None,
        }
    }
}

// ============ Default value functions ============

fn default_true() -> bool { true }
fn default_collection() -> String { "default_collection".into() }
fn default_persist_directory() -> PathBuf { PathBuf::from("./chroma_db") }
fn default_host() -> String { "localhost".into() }
fn default_port() -> u16 { 8000 }
fn default_tenant() -> String { "default_tenant".into() }
fn default_database() -> String { "default_database".into() }
fn default_timeout_secs() -> u64 { 30 }
fn default_embedding_url() -> String { "http://localhost:11434/v1".into() }
fn default_embedding_model() -> String { "nomic-embed-text".into() }
