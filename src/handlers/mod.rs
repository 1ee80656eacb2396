pub mod chat;
pub mod health;
pub mod recommendations;
pub mod research;

pub use chat::chat_config;
pub use health::{health_check, root};
pub use recommendations::recommendations_config;
pub use research::research_config;
