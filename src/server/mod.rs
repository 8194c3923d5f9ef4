//! HTTP surface of the service: shared state, route table and middleware.

pub mod handlers;
pub mod params;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Query,
    },
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::api::PowerClient;
use crate::models::ClimateParameter;

/// How `/api/{parameter}` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ClassifyMode {
    /// Echo the fetch plan; classification happens on `/api/{parameter}_after_res`.
    TwoStep,
    /// Fetch from the provider and return the category distribution directly.
    Live,
}

/// Immutable state shared by every request.
pub struct AppState {
    pub client: PowerClient,
    pub mode: ClassifyMode,
}

/// Builds the full router.
pub fn router(state: Arc<AppState>, enable_cors: bool) -> Router {
    let mode = state.mode;
    let mut app = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/timeseries", get(handlers::timeseries_handler));

    for parameter in ClimateParameter::ALL {
        app = app.route(
            &format!("/api/{}", parameter.slug()),
            get(
                move |Extension(state): Extension<Arc<AppState>>,
                      params: Result<Query<params::QueryParams>, QueryRejection>| async move {
                    handlers::category_handler(state, parameter, params).await
                },
            ),
        );

        if mode == ClassifyMode::TwoStep {
            app = app.route(
                &format!("/api/{}_after_res", parameter.slug()),
                post(move |body: Result<Json<Value>, JsonRejection>| async move {
                    handlers::after_result_handler(parameter, body).await
                }),
            );
        }
    }

    let app = app
        .fallback(handlers::not_found_handler)
        .layer(Extension(state))
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}
