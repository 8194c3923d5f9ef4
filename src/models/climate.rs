//! Defines data structures for the application.
//!
//! Includes structs for:
//! - Describing a validated climate query (`ClimateQuery`).
//! - The classified NASA POWER parameters (`ClimateParameter`).
//! - Daily records flattened from provider responses (`DailyRecord`).
//! - Endpoint payloads (`FetchPlan`, `CategoryDistribution`).

use crate::classify;
use crate::error::{AppError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marker the provider uses for a missing measurement.
pub const SENTINEL: f64 = -999.0;

/// Parameter codes returned by `/api/timeseries` when none are requested.
pub const DEFAULT_TIMESERIES_PARAMETERS: &str = "AOD_55_ADJ,CLOUD_AMT,T2M,SNODP,PRECTOTCORR,WS10M";

/// Label → percentage of records carrying that label. Only observed labels appear.
pub type CategoryDistribution = BTreeMap<String, f64>;

/// The six provider parameters that have a category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClimateParameter {
    /// Aerosol optical depth (550nm, adjusted).
    Aod,
    /// Cloud amount, percent.
    Cloud,
    /// Temperature at 2m, °C.
    Temperature,
    /// Snow depth.
    Snow,
    /// Corrected total precipitation.
    Rain,
    /// Wind speed at 10m.
    Wind,
}

impl ClimateParameter {
    pub const ALL: [ClimateParameter; 6] = [
        ClimateParameter::Aod,
        ClimateParameter::Cloud,
        ClimateParameter::Temperature,
        ClimateParameter::Snow,
        ClimateParameter::Rain,
        ClimateParameter::Wind,
    ];

    /// NASA POWER parameter code.
    pub fn code(self) -> &'static str {
        match self {
            ClimateParameter::Aod => "AOD_55_ADJ",
            ClimateParameter::Cloud => "CLOUD_AMT",
            ClimateParameter::Temperature => "T2M",
            ClimateParameter::Snow => "SNODP",
            ClimateParameter::Rain => "PRECTOTCORR",
            ClimateParameter::Wind => "WS10M",
        }
    }

    /// Path segment used under `/api/`.
    pub fn slug(self) -> &'static str {
        match self {
            ClimateParameter::Aod => "aod",
            ClimateParameter::Cloud => "cloud",
            ClimateParameter::Temperature => "temp",
            ClimateParameter::Snow => "snow",
            ClimateParameter::Rain => "rain",
            ClimateParameter::Wind => "wind",
        }
    }

    /// Category label for a single value of this parameter.
    pub fn categorize(self, value: f64) -> &'static str {
        match self {
            ClimateParameter::Aod => classify::categorize_aod(value),
            ClimateParameter::Cloud => classify::categorize_cloud(value),
            ClimateParameter::Temperature => classify::categorize_temp(value),
            ClimateParameter::Snow => classify::categorize_snow(value),
            ClimateParameter::Rain => classify::categorize_rainfall(value),
            ClimateParameter::Wind => classify::categorize_wind(value),
        }
    }
}

/// A validated point/date query against the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub target_date: NaiveDate,
    pub start_year: i32,
    pub end_year: i32,
    /// Provider codes, in request order. Never empty.
    pub parameters: Vec<String>,
    pub window_days: u32,
}

impl ClimateQuery {
    /// Builds a query, enforcing the year ordering and a non-empty parameter list.
    pub fn new(
        latitude: f64,
        longitude: f64,
        target_date: NaiveDate,
        start_year: i32,
        end_year: i32,
        parameters: Vec<String>,
        window_days: u32,
    ) -> Result<Self> {
        if start_year > end_year {
            return Err(AppError::input(format!(
                "start_year ({}) must not be after end_year ({})",
                start_year, end_year
            )));
        }
        if parameters.is_empty() {
            return Err(AppError::input("At least one parameter code is required"));
        }
        Ok(Self {
            latitude,
            longitude,
            target_date,
            start_year,
            end_year,
            parameters,
            window_days,
        })
    }
}

/// One complete day of provider data at the queried point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Elevation")]
    pub elevation: f64,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    /// Parameter code → value. Never contains `SENTINEL`.
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl DailyRecord {
    /// Value recorded for a parameter code, if it was requested.
    pub fn value(&self, code: &str) -> Option<f64> {
        self.values.get(code).copied()
    }
}

/// Echo of the fetch inputs, returned by the two-step category endpoints so the
/// caller can perform the fetch itself and post the result back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchPlan {
    pub start_year: i32,
    pub end_year: i32,
    pub month_start: u32,
    pub day_start: u32,
    pub month_end: u32,
    pub day_end: u32,
    pub parameters: Vec<String>,
    pub lat: f64,
    pub lon: f64,
}
