// src/routes.rs

use axum::{
    Json, Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{
    handlers::{course, progress},
    state::AppState,
    utils::jwt::auth_middleware,
};

const ACTIVITY_PATH: &str = "/{course}/modules/{module}/lessons/{lesson}/activities/{activity}";

#[derive(OpenApi)]
#[openapi(
    paths(
        course::list_courses,
        course::get_course,
        course::get_activity,
        progress::record_view,
        progress::submit_quiz,
        progress::get_progress,
    ),
    info(title = "Financedu progression API")
)]
pub struct ApiDoc;

/// Assembles the main application router.
///
/// * Public catalogue and activity routes.
/// * Completion and progress routes behind `auth_middleware`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let public_routes = Router::new()
        .route("/", get(course::list_courses))
        .route("/{course}", get(course::get_course))
        .route(ACTIVITY_PATH, get(course::get_activity));

    // Per-user routes: the verified token is the only source of identity.
    let learner_routes = Router::new()
        .route("/{course}/progress", get(progress::get_progress))
        .route(&format!("{}/view", ACTIVITY_PATH), post(progress::record_view))
        .route(&format!("{}/submit", ACTIVITY_PATH), post(progress::submit_quiz))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/courses", public_routes.merge(learner_routes))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
