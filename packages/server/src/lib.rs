pub mod catalog;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::get;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mercato Catalog API",
        version = "1.0.0",
        description = "Catalog management for an online shop: categories, products, \
            variants and their media files"
    ),
    paths(handlers::media::serve_media),
    tags(
        (name = "Categories", description = "Category CRUD and image handling"),
        (name = "Products", description = "Product CRUD with image and variant reconciliation"),
        (name = "Users", description = "User records"),
        (name = "Media", description = "Stored media files"),
    ),
)]
struct ApiDoc;

fn cors_layer(config: &crate::config::CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(config.max_age))
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);
    // Headroom over the per-file cap for the remaining form fields.
    let body_limit = DefaultBodyLimit::max(state.config.storage.max_upload_size as usize * 4);

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    router
        .route("/media/{*path}", get(handlers::media::serve_media))
        .layer(body_limit)
        .layer(cors)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}
