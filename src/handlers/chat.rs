use crate::{
    error::Result,
    models::{ChatMessage, ChatReceipt, ErrorResponse, SummaryResponse},
    services::{chat_summary::SUMMARY_NOT_AVAILABLE, ChatService},
};
use actix_web::{web, HttpResponse};

pub fn chat_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/chat")
            .route("", web::post().to(receive_chat))
            .route("/", web::post().to(receive_chat))
            .route("/summary/{event_id}", web::get().to(get_summary)),
    );
}

/// Store a chat message and report how many are buffered for its event
#[utoipa::path(
    post,
    path = "/chat/",
    tag = "Chat",
    request_body = ChatMessage,
    responses(
        (status = 200, description = "Message stored", body = ChatReceipt),
        (status = 400, description = "Malformed message"),
        (status = 500, description = "Chat history could not be written", body = ErrorResponse),
    )
)]
pub async fn receive_chat(
    message: web::Json<ChatMessage>,
    chat_service: web::Data<ChatService>,
) -> Result<HttpResponse> {
    let receipt = chat_service.receive(message.into_inner()).await?;
    Ok(HttpResponse::Ok().json(receipt))
}

#[utoipa::path(
    get,
    path = "/chat/summary/{event_id}",
    tag = "Chat",
    params(("event_id" = String, Path, description = "Event whose chat was summarized")),
    responses(
        (status = 200, description = "Latest summary, or a placeholder until one exists", body = SummaryResponse),
    )
)]
pub async fn get_summary(
    event_id: web::Path<String>,
    chat_service: web::Data<ChatService>,
) -> HttpResponse {
    let event_id = event_id.into_inner();
    let summary = chat_service
        .summary(&event_id)
        .unwrap_or_else(|| SUMMARY_NOT_AVAILABLE.to_string());

    HttpResponse::Ok().json(SummaryResponse { event_id, summary })
}
