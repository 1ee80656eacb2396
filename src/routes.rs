use actix_web::{web, HttpResponse};
use utoipa::OpenApi;
use utoipa_swagger_ui::{Config as SwaggerConfig, SwaggerUi};

use crate::app::ApiDoc;
use crate::handlers::{
    chat_config, health_check, recommendations_config, research_config, root,
};

/// Configure all routes for the API
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(root)
        .service(health_check)
        .configure(chat_config)
        .configure(research_config)
        .configure(recommendations_config)
        .service(openapi_route())
        .service(docs_redirect_route())
        .service(swagger_routes());
}

/// Configure Swagger UI routes
pub fn swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/docs/{_:.*}").config(SwaggerConfig::new(["/api-docs/openapi.json"]))
}

/// Configure OpenAPI documentation JSON endpoint
pub fn openapi_route() -> actix_web::Resource {
    web::resource("/api-docs/openapi.json")
        .route(web::get().to(|| async { HttpResponse::Ok().json(ApiDoc::openapi()) }))
}

/// Redirect from /docs to /docs/ to handle missing trailing slash
pub fn docs_redirect_route() -> actix_web::Resource {
    web::resource("/docs").route(web::get().to(|| async {
        HttpResponse::Found()
            .append_header(("Location", "/docs/"))
            .finish()
    }))
}
