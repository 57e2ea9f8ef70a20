use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        // Catalog
        .route("/api/items", get(handlers::list_items))
        .route("/api/items/:item_id", get(handlers::get_item))
        // Recommendations
        .route("/api/recommend/user/:user_id", get(handlers::recommend_for_user))
        .route("/api/recommend/cold-start", post(handlers::recommend_cold_start))
        .route("/api/similar/:item_id", get(handlers::recommend_similar))
        // Model management and reporting
        .route("/api/models/reload", post(handlers::reload_models))
        .route("/api/stats/performance", get(handlers::performance_stats))
        .route("/api/users", get(handlers::list_users))
        // Layers apply bottom-up: the request ID must exist before the
        // trace span is created, and CORS wraps everything
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
