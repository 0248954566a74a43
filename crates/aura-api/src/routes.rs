//! API routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{health, ready};
use crate::handlers::sessions::{
    create_session, export_report, get_recommendations, get_session, get_statistics, navigate,
    regenerate_preview, select_rating, set_comment, set_smoothing, submit_rating,
};
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    // Review workflow routes
    let session_routes = Router::new()
        // Page arrival: create or re-initialize the session for a video
        .route("/sessions", post(create_session))
        .route("/sessions/:video", get(get_session))
        // Navigation between trajectories
        .route("/sessions/:video/navigate", post(navigate))
        // Rating workflow
        .route("/sessions/:video/select", post(select_rating))
        .route("/sessions/:video/comment", post(set_comment))
        .route("/sessions/:video/submit", post(submit_rating))
        // Preview tuning
        .route("/sessions/:video/smoothing", post(set_smoothing))
        .route("/sessions/:video/regenerate", post(regenerate_preview))
        // Advisory statistics and report download
        .route("/sessions/:video/statistics", get(get_statistics))
        .route("/sessions/:video/report", get(export_report))
        // Cross-video tuning advice from the analysis service
        .route("/learning-recommendations", get(get_recommendations));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    Router::new()
        .nest("/api", session_routes)
        .merge(health_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
