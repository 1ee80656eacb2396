pub use chat::{ChatMessage, ChatReceipt, SummaryResponse};
pub use event::Event;
pub use research::{ResearchRequest, ResearchResponse};
pub use response::{ErrorResponse, HealthResponse, MessageResponse, RecommendationResponse};

mod chat;
mod event;
mod research;
mod response;
