use crate::error::{ApiError, Result};
use serde::Deserialize;

/// Runtime settings, read from the process environment (and `.env`).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub mongo_uri: Option<String>,
    pub mongo_database: String,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub groq_base_url: String,
    #[serde(default)]
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub chat_history_file: String,
    pub message_threshold: usize,
    pub llm_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::default().try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config: Config = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8000)?
            .set_default("mongo_database", "eventhub")?
            .set_default("groq_model", "llama3-70b-8192")?
            .set_default("groq_base_url", "https://api.groq.com/openai/v1")?
            .set_default("gemini_model", "gemini-2.0-flash")?
            .set_default(
                "gemini_base_url",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("chat_history_file", "chathistory.json")?
            .set_default("message_threshold", 1)?
            .set_default("llm_timeout_seconds", 60)?
            .add_source(source)
            .build()?
            .try_deserialize()?;

        if config.message_threshold == 0 {
            return Err(ApiError::ConfigError(
                "MESSAGE_THRESHOLD must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }

    /// The MongoDB connection string; the recommender cannot start without it
    pub fn require_mongo_uri(&self) -> Result<&str> {
        self.mongo_uri
            .as_deref()
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| {
                ApiError::ConfigError("MongoDB URI is missing in environment variables.".into())
            })
    }
}
