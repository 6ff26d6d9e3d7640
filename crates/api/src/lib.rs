//! HTTP API server for the gym booking system.
//!
//! Provides REST endpoints for the course-slot reservation flow, with
//! structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use domain::BookingService;
use metrics_exporter_prometheus::PrometheusHandle;
use store::BookingStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::JwtKeys;
use routes::bookings::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: BookingStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/bookings", post(routes::bookings::create::<S>))
        .route(
            "/user/previous-courses",
            get(routes::bookings::previous_courses::<S>),
        )
        .route(
            "/user/course/{course_id}",
            delete(routes::bookings::cancel::<S>),
        )
        .route(
            "/courses/{course_name}/slots",
            get(routes::bookings::slots::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the shared application state over a store.
pub fn create_state<S: BookingStore>(store: S, jwt: JwtKeys) -> Arc<AppState<S>> {
    Arc::new(AppState {
        booking_service: BookingService::new(store),
        jwt,
    })
}
