//! HTTP handlers. Each one extracts its inputs, calls into `service`, and lets
//! `AppError` pick the status code.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Query},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;

use super::params::QueryParams;
use super::{AppState, ClassifyMode};
use crate::error::{AppError, Result};
use crate::models::{ClimateParameter, DEFAULT_TIMESERIES_PARAMETERS};
use crate::service;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /health - Basic health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /api/{aod,cloud,temp,snow,rain,wind}
///
/// Two-step mode echoes the fetch plan; live mode fetches and classifies.
pub async fn category_handler(
    state: Arc<AppState>,
    parameter: ClimateParameter,
    params: std::result::Result<Query<QueryParams>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = params.map_err(|e| AppError::input(e.body_text()))?;
    let window_days = params.window_days(service::DEFAULT_WINDOW_DAYS)?;
    let query = params.to_query(vec![parameter.code().to_string()], window_days)?;

    match state.mode {
        ClassifyMode::TwoStep => Ok(Json(service::fetch_plan(&query)?).into_response()),
        ClassifyMode::Live => {
            let distribution = service::live_distribution(&state.client, &query, parameter).await?;
            Ok(Json(distribution).into_response())
        },
    }
}

/// POST /api/{aod,cloud,temp,snow,rain,wind}_after_res
pub async fn after_result_handler(
    parameter: ClimateParameter,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Response> {
    let Json(body) = body.map_err(|e| AppError::input(e.body_text()))?;
    let distribution = service::distribution_from_result(&body, parameter)?;
    Ok(Json(distribution).into_response())
}

/// GET /api/timeseries
pub async fn timeseries_handler(
    Extension(state): Extension<Arc<AppState>>,
    params: std::result::Result<Query<QueryParams>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = params.map_err(|e| AppError::input(e.body_text()))?;
    let codes = params.parameter_codes(DEFAULT_TIMESERIES_PARAMETERS);
    let query = params.to_query(codes, 0)?;

    let records = service::timeseries(&state.client, &query).await?;
    Ok(Json(records).into_response())
}

/// Unmatched routes.
pub async fn not_found_handler(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("Not Found: {}", uri.path()) })),
    )
        .into_response()
}

/// Renders a handler panic as a 500 with the usual error body.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::Internal(detail).into_response()
}
