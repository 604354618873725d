//! HTTP surface of the poster service.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

pub use state::AppState;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/generate-poster", post(handlers::generate_poster))
        .route("/api/generate-text", post(handlers::generate_text))
        .route("/api/generate-image", post(handlers::generate_image))
        .route(
            "/api/preview-poster/:poster_id",
            get(handlers::preview_poster),
        )
        .route(
            "/api/download-poster/:poster_id",
            get(handlers::download_poster),
        )
        .route("/api/delete-poster/:poster_id", delete(handlers::delete_poster))
        .route("/api/templates", get(handlers::list_templates))
        .route("/api/themes", get(handlers::list_themes));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
