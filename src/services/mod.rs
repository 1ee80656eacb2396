pub mod chat_history;
pub mod chat_summary;
pub mod event_store;
pub mod groq;
pub mod recommendation;
pub mod research;

// Re-export public types
pub use chat_history::ChatHistory;
pub use chat_summary::ChatService;
pub use event_store::{EventStore, MongoEventStore};
pub use groq::{GroqSummarizer, Summarizer};
pub use recommendation::RecommendationService;
pub use research::{GeminiClient, ResearchAgent};
