//! Server configuration.
//!
//! Loaded from environment variables (with a `.env` file honored via
//! dotenvy). Malformed numeric values are startup errors; everything else
//! falls back to a sensible default.

mod env;

use std::path::PathBuf;

/// Server configuration
///
/// - Listener settings (host, port)
/// - Language-model endpoint (OpenAI-compatible)
/// - Extraction cache ceiling and optional extraction timeout
/// - Optional reference-data seed file
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    // OpenAI-compatible extraction endpoint
    pub openai_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,

    /// Entry ceiling for the extraction cache before it is wiped.
    pub cache_capacity: usize,
    /// Optional hard cap on one extractor call. None means unbounded.
    pub extraction_timeout_seconds: Option<u64>,

    /// Optional JSON file seeding customers/drivers/products/jargon.
    pub reference_data_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Socket address string for the listener.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            cache_capacity: crate::core::cache::DEFAULT_CACHE_CAPACITY,
            extraction_timeout_seconds: None,
            reference_data_path: None,
        }
    }
}
