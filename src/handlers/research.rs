use crate::{
    models::{ResearchRequest, ResearchResponse},
    services::ResearchAgent,
};
use actix_web::{web, HttpResponse};

pub fn research_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/research")
            .route("", web::post().to(research_event))
            .route("/", web::post().to(research_event)),
    );
}

/// Research an event, its artist and optional NGO with a search-grounded model.
///
/// Model failures are reported in the `error` field with a 200 status.
#[utoipa::path(
    post,
    path = "/research/",
    tag = "Research",
    request_body = ResearchRequest,
    responses(
        (status = 200, description = "Generated research, or the failure in `error`", body = ResearchResponse),
    )
)]
pub async fn research_event(
    request: web::Json<ResearchRequest>,
    agent: web::Data<ResearchAgent>,
) -> HttpResponse {
    HttpResponse::Ok().json(agent.research(&request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_unconfigured_research_returns_error_field() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ResearchAgent::new(None)))
                .configure(research_config),
        )
        .await;

        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/research/")
                .set_json(json!({ "event_name": "Rhythm for Rivers", "artist_name": "The Tide Crew" }))
                .to_request(),
        )
        .await;

        assert_eq!(body["generated_text"], Value::Null);
        assert_eq!(body["grounding_metadata_rendered_content"], Value::Null);
        assert_eq!(
            body["error"],
            "Google GenAI Client not initialized. Check API key and environment variables."
        );
    }
}
