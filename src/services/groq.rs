use crate::error::{ApiError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

const SUMMARY_TEMPERATURE: f32 = 0.3;

const SUMMARY_PROMPT: &str = "
You are an assistant summarizing a chat event. Write a 2–3 paragraph summary capturing main topics, names, and insights.

Chat:
{chat}

Summary:
";

/// Turns a transcript of chat lines into a prose summary
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, chat: &str) -> Result<String>;
}

pub fn summary_prompt(chat: &str) -> String {
    SUMMARY_PROMPT.replace("{chat}", chat)
}

/// Summarizer backed by Groq's OpenAI-compatible chat completions API
#[derive(Debug, Clone)]
pub struct GroqSummarizer {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionContent,
}

#[derive(Debug, Deserialize)]
struct CompletionContent {
    content: String,
}

impl GroqSummarizer {
    pub fn new(
        api_key: Option<String>,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Summarizer for GroqSummarizer {
    async fn summarize(&self, chat: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ApiError::ConfigError("GROQ_API_KEY is not set; cannot summarize chat".to_string())
        })?;

        let prompt = summary_prompt(chat);
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![CompletionMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: SUMMARY_TEMPERATURE,
        };

        debug!("Requesting chat summary from Groq model {}", self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Groq API error {}: {}", status, body);
            return Err(ApiError::ExternalServiceError(format!(
                "Groq API returned {}: {}",
                status, body
            )));
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            ApiError::SerializationError(format!("Failed to parse Groq response: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| ApiError::ExternalServiceError("Empty response from Groq".to_string()))
    }
}
