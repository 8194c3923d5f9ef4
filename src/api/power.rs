//! Provides a client for the NASA POWER daily point API.
//!
//! This module defines the `PowerClient` struct, which issues one request per
//! year of a `ClimateQuery` and flattens the responses into `DailyRecord`s.

use crate::error::{AppError, Result};
use crate::models::{ClimateQuery, DailyRecord, SENTINEL};
use crate::window::{DateWindow, YearRange};
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const BASE_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";

/// Upper bound for a single per-year request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// An asynchronous client for fetching daily point data from NASA POWER.
pub struct PowerClient {
    client: Client,
    base_url: String,
}

impl PowerClient {
    /// Creates a new `PowerClient` for the given endpoint URL (normally `BASE_URL`).
    ///
    /// Every request made through the client is bounded by `timeout`.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches every year of `query` sequentially and concatenates the complete records.
    ///
    /// A year that fails for any upstream reason is logged and skipped. Fails with
    /// `AppError::NoData` when no year produced a record.
    pub async fn fetch_records(&self, query: &ClimateQuery) -> Result<Vec<DailyRecord>> {
        let window = DateWindow::around(query.target_date, query.window_days)?;
        let ranges = window.year_ranges(query.start_year, query.end_year);

        info!(
            "Fetching {} for ({}, {}) around {} (±{} days) over {} year(s)",
            query.parameters.join(","),
            query.latitude,
            query.longitude,
            query.target_date,
            query.window_days,
            ranges.len()
        );

        let mut records = Vec::new();
        for range in &ranges {
            match self.fetch_year(query, range).await {
                Ok(batch) => {
                    debug!("Year {}: {} complete record(s)", range.year, batch.len());
                    records.extend(batch);
                },
                Err(AppError::Api(e)) if e.is_timeout() => {
                    warn!("Timeout for year {}, skipping...", range.year);
                },
                Err(e) if e.is_upstream() => {
                    error!("Request failed for year {}: {}", range.year, e);
                },
                Err(e) => return Err(e),
            }
        }

        if records.is_empty() {
            return Err(AppError::NoData);
        }

        info!("Collected {} daily record(s)", records.len());
        Ok(records)
    }

    /// Fetches and parses a single year's range.
    pub async fn fetch_year(
        &self,
        query: &ClimateQuery,
        range: &YearRange,
    ) -> Result<Vec<DailyRecord>> {
        let params = request_params(query, range);
        debug!("GET {} for year {} ({:?})", self.base_url, range.year, params);

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?;

        // Read as text first so decode failures are reported as JSON errors.
        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body)?;

        parse_records(&payload, &query.parameters)
    }
}

/// Fixed query-string shape of the daily point endpoint.
fn request_params(query: &ClimateQuery, range: &YearRange) -> Vec<(&'static str, String)> {
    vec![
        ("parameters", query.parameters.join(",")),
        ("community", "RE".to_string()),
        ("longitude", query.longitude.to_string()),
        ("latitude", query.latitude.to_string()),
        ("start", range.start_param()),
        ("end", range.end_param()),
        ("format", "JSON".to_string()),
        ("units", "metric".to_string()),
        ("header", "true".to_string()),
        ("time-standard", "utc".to_string()),
    ]
}

/// Flattens a POWER JSON payload into complete daily records.
///
/// Dates are taken from the first requested parameter, in payload order. A
/// value missing from any other parameter counts as `SENTINEL`, and any day
/// holding `SENTINEL` is dropped entirely.
pub fn parse_records(payload: &Value, parameters: &[String]) -> Result<Vec<DailyRecord>> {
    let coordinates = payload
        .pointer("/geometry/coordinates")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::MissingField("geometry.coordinates".to_string()))?;

    let (longitude, latitude, elevation) = match coordinates.as_slice() {
        [lon, lat, elev] => (coordinate(lon)?, coordinate(lat)?, coordinate(elev)?),
        other => {
            return Err(AppError::Malformed(format!(
                "expected 3 coordinates, got {}",
                other.len()
            )))
        },
    };

    let series = payload
        .pointer("/properties/parameter")
        .and_then(Value::as_object)
        .ok_or_else(|| AppError::MissingField("properties.parameter".to_string()))?;

    let first = parameters
        .first()
        .ok_or_else(|| AppError::input("At least one parameter code is required"))?;
    let first_series = series
        .get(first)
        .and_then(Value::as_object)
        .ok_or_else(|| AppError::MissingField(format!("properties.parameter.{}", first)))?;

    let mut records = Vec::with_capacity(first_series.len());
    for date_key in first_series.keys() {
        let date = NaiveDate::parse_from_str(date_key, "%Y%m%d")
            .map_err(|e| AppError::Malformed(format!("invalid date key '{}': {}", date_key, e)))?;

        let mut values = BTreeMap::new();
        let mut complete = true;
        for code in parameters {
            let value = series
                .get(code)
                .and_then(|s| s.get(date_key))
                .and_then(Value::as_f64)
                .unwrap_or(SENTINEL);
            // Exact match on the provider's marker.
            if value == SENTINEL {
                complete = false;
            }
            values.insert(code.clone(), value);
        }

        if complete {
            records.push(DailyRecord {
                longitude,
                latitude,
                elevation,
                date,
                values,
            });
        }
    }

    Ok(records)
}

fn coordinate(value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| AppError::Malformed(format!("non-numeric coordinate: {}", value)))
}
