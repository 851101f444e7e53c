use std::{env, net::SocketAddr, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
}

/// Where generation history is kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryBackend {
    /// Process memory; lost on restart.
    Memory,
    /// One JSON object in an S3 bucket, read and rewritten on every change.
    S3 { bucket: String, object_key: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub groq_api_key: Option<String>,
    pub groq_api_base: String,
    pub memegen_base_url: String,
    pub history_backend: HistoryBackend,
    pub aws_region: String,
    // Optional endpoint for LocalStack
    pub localstack_endpoint: Option<String>,
    /// Prebuilt web UI served for every route the API does not claim.
    pub static_dir: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors, relies on env vars otherwise)
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset, the way a blank line in .env usually means "not configured"
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_address_str = match var("BIND_ADDRESS") {
            Some(addr) => addr,
            None => format!("0.0.0.0:{}", var("PORT").unwrap_or_else(|| "3001".to_string())),
        };
        let bind_address = SocketAddr::from_str(&bind_address_str)
            .map_err(|e| ConfigError::InvalidVar("BIND_ADDRESS".into(), e.to_string()))?;

        let history_backend = match var("HISTORY_BACKEND").as_deref().unwrap_or("memory") {
            "memory" => HistoryBackend::Memory,
            "s3" => HistoryBackend::S3 {
                bucket: var("HISTORY_BUCKET")
                    .ok_or_else(|| ConfigError::MissingVar("HISTORY_BUCKET".into()))?,
                object_key: var("HISTORY_OBJECT_KEY")
                    .unwrap_or_else(|| "history/meme_history.json".to_string()),
            },
            other => {
                return Err(ConfigError::InvalidVar(
                    "HISTORY_BACKEND".into(),
                    format!("expected 'memory' or 's3', got '{}'", other),
                ));
            }
        };

        Ok(Config {
            bind_address,
            groq_api_key: var("GROQ_API_KEY"),
            groq_api_base: var("GROQ_API_BASE")
                .unwrap_or_else(|| "https://api.groq.com/openai/v1".to_string()),
            memegen_base_url: var("MEMEGEN_BASE_URL")
                .unwrap_or_else(|| "https://api.memegen.link".to_string()),
            history_backend,
            aws_region: var("AWS_DEFAULT_REGION").unwrap_or_else(|| "ca-central-1".to_string()),
            localstack_endpoint: var("AWS_ENDPOINT_URL"),
            static_dir: var("STATIC_DIR"),
        })
    }
}
