//! Query-string parsing shared by every GET endpoint.

use crate::error::{AppError, Result};
use crate::models::ClimateQuery;
use chrono::NaiveDate;
use serde::Deserialize;
use std::str::FromStr;

pub const DEFAULT_START_YEAR: i32 = 2000;
pub const DEFAULT_END_YEAR: i32 = 2025;

/// Raw query parameters. Everything is optional here so that missing and
/// malformed values produce our own error messages instead of extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    pub lat: Option<String>,
    pub long: Option<String>,
    /// Target date, `YYYY-MM-DD`.
    pub date: Option<String>,
    pub start_year: Option<String>,
    pub end_year: Option<String>,
    /// Days on each side of the target date (category endpoints only).
    pub window: Option<String>,
    /// Comma-separated provider codes (timeseries only).
    pub parameters: Option<String>,
}

impl QueryParams {
    /// Validates the shared parameters and builds a query for `parameters`.
    pub fn to_query(&self, parameters: Vec<String>, window_days: u32) -> Result<ClimateQuery> {
        let (lat, long, date) = self.required()?;

        let latitude: f64 = parse_number("lat", lat)?;
        let longitude: f64 = parse_number("long", long)?;
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::input(format!("'lat' must be between -90 and 90, got {}", lat)));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::input(format!(
                "'long' must be between -180 and 180, got {}",
                long
            )));
        }

        let target_date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::input("Invalid date format. Expected YYYY-MM-DD"))?;

        let start_year = optional_number("start_year", self.start_year.as_deref())?
            .unwrap_or(DEFAULT_START_YEAR);
        let end_year =
            optional_number("end_year", self.end_year.as_deref())?.unwrap_or(DEFAULT_END_YEAR);

        ClimateQuery::new(
            latitude,
            longitude,
            target_date,
            start_year,
            end_year,
            parameters,
            window_days,
        )
    }

    /// The caller's `window`, or `default` when absent.
    pub fn window_days(&self, default: u32) -> Result<u32> {
        Ok(optional_number("window", self.window.as_deref())?.unwrap_or(default))
    }

    /// Trimmed, non-empty codes from `parameters`, or `default` when absent.
    pub fn parameter_codes(&self, default: &str) -> Vec<String> {
        self.parameters
            .as_deref()
            .unwrap_or(default)
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn required(&self) -> Result<(&str, &str, &str)> {
        let fields = [("lat", &self.lat), ("long", &self.long), ("date", &self.date)];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect();

        match (&self.lat, &self.long, &self.date) {
            (Some(lat), Some(long), Some(date)) if missing.is_empty() => {
                Ok((lat.as_str(), long.as_str(), date.as_str()))
            },
            _ => Err(AppError::input(format!(
                "Missing required query parameters: {}",
                missing.join(", ")
            ))),
        }
    }
}

fn parse_number<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::input(format!("Invalid value for '{}': '{}'", name, raw)))
}

fn optional_number<T: FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_number(name, value).map(Some),
    }
}
