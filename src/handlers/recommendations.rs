use crate::{
    error::Result,
    models::{ErrorResponse, MessageResponse, RecommendationResponse},
    services::{recommendation::DEFAULT_TOP_N, RecommendationService},
};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecommendationQuery {
    /// Maximum number of events to return
    #[serde(default = "default_top_n")]
    #[param(default = 3)]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

pub fn recommendations_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/recommendations/{user_id}").route(web::get().to(get_recommendations)),
    );
}

/// Recommend live or upcoming events for a user
#[utoipa::path(
    get,
    path = "/recommendations/{user_id}",
    tag = "Recommendations",
    params(
        ("user_id" = String, Path, description = "ObjectId of the user, as hex"),
        RecommendationQuery,
    ),
    responses(
        (status = 200, description = "Ranked events, or a message when there are none", body = RecommendationResponse),
        (status = 400, description = "User id is not a valid ObjectId", body = ErrorResponse),
        (status = 500, description = "Database or clustering failure", body = ErrorResponse),
    ),
    summary = "Get event recommendations",
    description = "Scores live and upcoming events the user has not registered for by description similarity to their past events, shared cluster and matching event type. Falls back to the newest events when nothing is left to discover."
)]
pub async fn get_recommendations(
    user_id: web::Path<String>,
    query: web::Query<RecommendationQuery>,
    recommendation_service: web::Data<RecommendationService>,
) -> Result<HttpResponse> {
    let user_id = user_id.into_inner();
    let recommendations = recommendation_service
        .recommend_events(&user_id, query.top_n)
        .await?;

    if recommendations.is_empty() {
        return Ok(HttpResponse::Ok().json(MessageResponse::new("No recommendations found")));
    }

    Ok(HttpResponse::Ok().json(RecommendationResponse {
        user_id,
        recommended_events: recommendations.iter().map(|event| event.to_json()).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::Event, services::EventStore};
    use actix_web::{http::StatusCode, test, App};
    use async_trait::async_trait;
    use mongodb::bson::{doc, oid::ObjectId};
    use serde_json::{json, Value};
    use std::sync::Arc;

    /// Store holding a fixed set of live events and no registrations
    struct LiveOnlyStore(Vec<Event>);

    #[async_trait]
    impl EventStore for LiveOnlyStore {
        async fn registered_event_ids(&self, _user: ObjectId) -> Result<Vec<ObjectId>> {
            Ok(Vec::new())
        }

        async fn events_by_ids(&self, _ids: &[ObjectId]) -> Result<Vec<Event>> {
            Ok(Vec::new())
        }

        async fn live_events(&self) -> Result<Vec<Event>> {
            Ok(self.0.clone())
        }

        async fn candidate_events(&self, _user: ObjectId) -> Result<Vec<Event>> {
            Ok(self.0.clone())
        }

        async fn latest_events(&self, limit: usize) -> Result<Vec<Event>> {
            Ok(self.0.iter().take(limit).cloned().collect())
        }
    }

    async fn call(store: LiveOnlyStore, uri: &str) -> (StatusCode, Value) {
        let service = RecommendationService::new(Arc::new(store));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .configure(recommendations_config),
        )
        .await;
        let response =
            test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = response.status();
        let body: Value = test::read_body_json(response).await;
        (status, body)
    }

    #[actix_web::test]
    async fn test_recommendations_render_ids_as_strings() {
        let ids: Vec<ObjectId> = (0..4).map(|_| ObjectId::new()).collect();
        let events = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                Event::new(doc! {
                    "_id": *id,
                    "title": format!("Event {}", i),
                    "description": format!("street food market stall {}", i),
                    "eventType": "market",
                    "status": "live",
                })
            })
            .collect();
        let user = ObjectId::new().to_hex();

        let (status, body) = call(
            LiveOnlyStore(events),
            &format!("/recommendations/{}?top_n=2", user),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], user);
        let recommended = body["recommended_events"].as_array().unwrap();
        assert_eq!(recommended.len(), 2);
        assert_eq!(recommended[0]["_id"], ids[0].to_hex());
        assert_eq!(recommended[1]["_id"], ids[1].to_hex());
    }

    #[actix_web::test]
    async fn test_no_recommendations_message() {
        let (status, body) = call(
            LiveOnlyStore(Vec::new()),
            &format!("/recommendations/{}", ObjectId::new().to_hex()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "No recommendations found" }));
    }

    #[actix_web::test]
    async fn test_invalid_user_id_is_bad_request() {
        let (status, body) = call(LiveOnlyStore(Vec::new()), "/recommendations/nobody").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("invalid ObjectId"));
    }
}
