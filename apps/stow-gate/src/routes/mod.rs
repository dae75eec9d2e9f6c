//! API routes

pub mod upload;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    backend::ActiveBackend,
    dto::upload::{ErrorResponse, UploadForm, UploadResponse},
    handlers, AppState,
};

/// Room for multipart boundaries and the non-file fields
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::upload::upload_handler,
        health_handler
    ),
    components(
        schemas(UploadForm, UploadResponse, ErrorResponse)
    ),
    tags(
        (name = "upload", description = "Asset upload endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "StowGate API",
        version = "0.1.0",
        description = "Asset ingestion service for Stowage",
        contact(
            name = "Stowage Team"
        )
    )
)]
pub struct ApiDoc;

/// Create the main application router
///
/// When the local backend is active its storage root is served at
/// `/uploads`, which is where the URLs it hands out point.
pub fn create_router(state: AppState) -> Router {
    let max_bytes = state.ingestion_service.policy().max_bytes;
    let body_limit = usize::try_from(max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(upload::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .route("/health", axum::routing::get(health_handler));

    if let ActiveBackend::Local(local) = state.ingestion_service.backend() {
        router = router.nest_service("/uploads", ServeDir::new(local.root()));
    }

    router.with_state(state)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    ),
    tag = "health"
)]
async fn health_handler() -> &'static str {
    "OK"
}
