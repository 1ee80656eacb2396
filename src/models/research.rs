use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResearchRequest {
    pub event_name: String,
    pub artist_name: String,
    #[serde(default)]
    pub ngo_name: Option<String>,
}

/// Research answer; exactly one of `generated_text` / `error` is normally set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResearchResponse {
    pub generated_text: Option<String>,
    pub grounding_metadata_rendered_content: Option<String>,
    pub error: Option<String>,
}

impl ResearchResponse {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }
}
