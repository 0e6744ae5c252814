use axum::{middleware, routing::get, routing::post, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            // Request id first, so the trace span can record it
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Recommendations
        .route("/recommendations", post(handlers::recommend))
        .route("/recommendations/me", get(handlers::recommend_for_user))
        // Catalog
        .route("/movies/search", get(handlers::search_movies))
        .route("/movies/:id", get(handlers::get_movie))
        .route("/directors/:id/movies", get(handlers::director_movies))
}
