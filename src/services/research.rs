use crate::{
    error::{ApiError, Result},
    models::{ResearchRequest, ResearchResponse},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

const CLIENT_NOT_INITIALIZED: &str =
    "Google GenAI Client not initialized. Check API key and environment variables.";
const NO_CONTENT_PARTS: &str = "No content parts found in the response.";

/// Build the research question for an event, its performer and optional NGO
pub fn research_prompt(request: &ResearchRequest) -> String {
    let event = &request.event_name;
    let artist = &request.artist_name;

    let mut query = format!(
        "Provide a comprehensive description for the event '{event}' featuring '{artist}'. \
         Include details about the event's theme, purpose, and what attendees can expect. \
         Also, provide background information on '{artist}', treating this as potentially an individual artist, group, or crew. \
         Include their notable work, style, and artistic background. "
    );

    match request.ngo_name.as_deref().filter(|ngo| !ngo.is_empty()) {
        Some(ngo) => query.push_str(&format!(
            "This event is organized by or benefits the NGO '{ngo}'. \
             Detail '{ngo}'s mission, impactful projects, and how they utilize funds to create positive change. \
             Explain how '{event}' directly supports '{ngo}'s specific objectives or causes. \
             If '{artist}' has any connection to '{ngo}' (such as being comprised of NGO staff, volunteers, or previous collaborators), \
             highlight this relationship and how it strengthens the event's purpose. \
             Emphasize the tangible impact attendees will make by supporting this charitable initiative. "
        )),
        None => query.push_str(
            "If this is a recurring event, mention any past successes or highlights. \
             Focus on creating an engaging overview for potential attendees. ",
        ),
    }

    query
}

/// Gemini `generateContent` client with Google Search grounding enabled
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<GenerateContent>,
    tools: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct GenerateContent {
    parts: Vec<GeneratePart>,
}

#[derive(Debug, Serialize)]
struct GeneratePart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    search_entry_point: Option<SearchEntryPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchEntryPoint {
    rendered_content: Option<String>,
}

/// Text and grounding widget extracted from a Gemini answer
#[derive(Debug, Clone, PartialEq)]
pub struct GroundedAnswer {
    pub text: String,
    pub rendered_content: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn generate_grounded(&self, prompt: &str) -> Result<GroundedAnswer> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateRequest {
            contents: vec![GenerateContent {
                parts: vec![GeneratePart {
                    text: prompt.to_string(),
                }],
            }],
            tools: vec![json!({ "google_search": {} })],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::ExternalServiceError(format!(
                "Gemini API returned {}: {}",
                status, body
            )));
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            ApiError::SerializationError(format!("Failed to parse Gemini response: {}", e))
        })?;

        let first = generated.candidates.into_iter().next();
        let rendered_content = first
            .as_ref()
            .and_then(|c| c.grounding_metadata.as_ref())
            .and_then(|g| g.search_entry_point.as_ref())
            .and_then(|s| s.rendered_content.clone());

        let parts: Vec<String> = first
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let text = if parts.is_empty() {
            NO_CONTENT_PARTS.to_string()
        } else {
            parts.join("\n")
        };

        Ok(GroundedAnswer {
            text,
            rendered_content,
        })
    }
}

/// Answers research questions about events; failures are reported in the
/// response body rather than as HTTP errors
#[derive(Debug, Clone)]
pub struct ResearchAgent {
    gemini: Option<GeminiClient>,
}

impl ResearchAgent {
    pub fn new(gemini: Option<GeminiClient>) -> Self {
        if gemini.is_none() {
            error!("Google GenAI client not configured; research requests will fail");
        }
        Self { gemini }
    }

    pub async fn research(&self, request: &ResearchRequest) -> ResearchResponse {
        let Some(gemini) = &self.gemini else {
            return ResearchResponse::failed(CLIENT_NOT_INITIALIZED);
        };

        info!(
            "Researching event '{}' featuring '{}'",
            request.event_name, request.artist_name
        );

        match gemini.generate_grounded(&research_prompt(request)).await {
            Ok(answer) => ResearchResponse {
                generated_text: Some(answer.text),
                grounding_metadata_rendered_content: answer.rendered_content,
                error: None,
            },
            Err(e) => {
                error!("Error during GenAI call: {}", e);
                ResearchResponse::failed(format!("An error occurred: {}", e))
            }
        }
    }
}
