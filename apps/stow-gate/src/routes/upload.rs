//! Upload routes

use axum::{routing::post, Router};

use crate::{handlers::upload::upload_handler, AppState};

/// Create upload routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/upload", post(upload_handler))
}
