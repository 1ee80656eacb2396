use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single chat line posted to an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[schema(example = "681e52223ab5f5946dcacec0")]
    pub event_id: String,
    pub user_id: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatReceipt {
    pub status: String,
    pub new_messages: usize,
}

impl ChatReceipt {
    pub fn received(new_messages: usize) -> Self {
        Self {
            status: "message received".to_string(),
            new_messages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    #[serde(rename = "eventId")]
    pub event_id: String,
    pub summary: String,
}
