use std::env;
use std::path::PathBuf;

use super::ServerConfig;

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Reads configuration from environment variables, with sensible
    /// defaults. Also loads from a .env file if present using dotenvy.
    ///
    /// # Errors
    /// Returns an error if a numeric variable is present but malformed.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let defaults = ServerConfig::default();

        let host = env::var("HOST").unwrap_or(defaults.host);
        let port = match env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|e| format!("Invalid port number: {e}"))?,
            Err(_) => defaults.port,
        };

        let openai_base_url = env::var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url);
        let openai_api_key = env::var("OPENAI_API_KEY").ok();
        let openai_model = env::var("OPENAI_MODEL").unwrap_or(defaults.openai_model);

        let cache_capacity = match env::var("CACHE_CAPACITY") {
            Ok(value) => value
                .parse::<usize>()
                .map_err(|e| format!("Invalid CACHE_CAPACITY: {e}"))?,
            Err(_) => defaults.cache_capacity,
        };

        let extraction_timeout_seconds = match env::var("EXTRACTION_TIMEOUT_SECONDS") {
            Ok(value) => Some(
                value
                    .parse::<u64>()
                    .map_err(|e| format!("Invalid EXTRACTION_TIMEOUT_SECONDS: {e}"))?,
            ),
            Err(_) => None,
        };

        let reference_data_path = env::var("REFERENCE_DATA_PATH").ok().map(PathBuf::from);

        Ok(Self {
            host,
            port,
            openai_base_url,
            openai_api_key,
            openai_model,
            cache_capacity,
            extraction_timeout_seconds,
            reference_data_path,
        })
    }
}
