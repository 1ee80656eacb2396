use crate::{
    config::Config,
    error::Result,
    handlers,
    models::{
        ChatMessage, ChatReceipt, ErrorResponse, HealthResponse, MessageResponse,
        RecommendationResponse, ResearchRequest, ResearchResponse, SummaryResponse,
    },
    routes::api_routes,
    services::{
        ChatHistory, ChatService, GeminiClient, GroqSummarizer, MongoEventStore,
        RecommendationService, ResearchAgent,
    },
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::info;
use std::{net::TcpListener, sync::Arc, time::Duration};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::root,
        handlers::health::health_check,
        handlers::chat::receive_chat,
        handlers::chat::get_summary,
        handlers::research::research_event,
        handlers::recommendations::get_recommendations,
    ),
    components(schemas(
        ChatMessage,
        ChatReceipt,
        SummaryResponse,
        ResearchRequest,
        ResearchResponse,
        RecommendationResponse,
        MessageResponse,
        HealthResponse,
        ErrorResponse,
    )),
    tags(
        (name = "System", description = "Service status"),
        (name = "Chat", description = "Event chat and AI summaries"),
        (name = "Research", description = "Search-grounded event research"),
        (name = "Recommendations", description = "Personalized event recommendations"),
    ),
    info(title = "EventHub AI API", version = "0.1.0")
)]
pub struct ApiDoc;

pub struct Application {
    port: u16,
    host: String,
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: &Config) -> Self {
        Self {
            port: config.port,
            host: config.host.clone(),
            config: config.clone(),
        }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        let bind_address = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&bind_address)?;
        info!("Starting server at http://{}", bind_address);

        self.run_with_listener(listener).await
    }

    /// Run the server with a specific TCP listener
    /// This is useful for testing where we want to use a random port
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        let timeout = Duration::from_secs(self.config.llm_timeout_seconds);

        // Chat summaries
        let history = ChatHistory::open(&self.config.chat_history_file)
            .await
            .context("Failed to open chat history file")?;
        let summarizer = GroqSummarizer::new(
            self.config.groq_api_key.clone(),
            &self.config.groq_model,
            &self.config.groq_base_url,
            timeout,
        )?;
        let chat_service = web::Data::new(ChatService::new(
            history,
            Arc::new(summarizer),
            self.config.message_threshold,
        ));

        // Research agent; a missing key is reported per request
        let gemini = match self.config.google_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Some(GeminiClient::new(
                key,
                &self.config.gemini_model,
                &self.config.gemini_base_url,
                timeout,
            )?),
            _ => None,
        };
        let research_agent = web::Data::new(ResearchAgent::new(gemini));

        // Recommendations
        let store = MongoEventStore::connect(
            self.config.require_mongo_uri()?,
            &self.config.mongo_database,
        )
        .await
        .context("Failed to connect to MongoDB")?;
        let recommendation_service =
            web::Data::new(RecommendationService::new(Arc::new(store)));

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(chat_service.clone())
                .app_data(research_agent.clone())
                .app_data(recommendation_service.clone())
                .configure(api_routes)
        })
        .listen(listener)?
        .run()
        .await?;

        Ok(())
    }
}
