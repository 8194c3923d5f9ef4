//! Endpoint operations, independent of the HTTP layer.
//!
//! Each function takes an already-parsed query (or the raw posted body) and
//! returns a value or an `AppError`; the server module only wires them to routes.

use crate::api::PowerClient;
use crate::error::{AppError, Result};
use crate::models::{CategoryDistribution, ClimateParameter, ClimateQuery, DailyRecord, FetchPlan};
use crate::window::DateWindow;
use serde_json::Value;
use std::collections::BTreeMap;

/// Days sampled on each side of the target date by the category endpoints.
pub const DEFAULT_WINDOW_DAYS: u32 = 5;

/// Describes the fetch a two-step caller should perform, without contacting the provider.
pub fn fetch_plan(query: &ClimateQuery) -> Result<FetchPlan> {
    let window = DateWindow::around(query.target_date, query.window_days)?;
    let (month_start, day_start) = window.start_month_day();
    let (month_end, day_end) = window.end_month_day();

    Ok(FetchPlan {
        start_year: query.start_year,
        end_year: query.end_year,
        month_start,
        day_start,
        month_end,
        day_end,
        parameters: query.parameters.clone(),
        lat: query.latitude,
        lon: query.longitude,
    })
}

/// Raw daily records for the query.
pub async fn timeseries(client: &PowerClient, query: &ClimateQuery) -> Result<Vec<DailyRecord>> {
    client.fetch_records(query).await
}

/// Fetches `parameter` for the query and classifies it in one pass.
pub async fn live_distribution(
    client: &PowerClient,
    query: &ClimateQuery,
    parameter: ClimateParameter,
) -> Result<CategoryDistribution> {
    let records = client.fetch_records(query).await?;
    distribution_from_records(&records, parameter)
}

/// Classifies records already held in memory.
pub fn distribution_from_records(
    records: &[DailyRecord],
    parameter: ClimateParameter,
) -> Result<CategoryDistribution> {
    let values = records.iter().filter_map(|r| r.value(parameter.code()));
    distribution(values, parameter).ok_or_else(|| missing_parameter(parameter))
}

/// Classifies a result set posted back by the caller as `{"api_result": ...}`.
///
/// `api_result` may be the array of records itself or a JSON string encoding it.
/// Records without the parameter (or with `null`) are ignored.
pub fn distribution_from_result(
    body: &Value,
    parameter: ClimateParameter,
) -> Result<CategoryDistribution> {
    let api_result = body
        .get("api_result")
        .ok_or_else(|| AppError::input("Missing 'api_result' in request body"))?;

    let decoded;
    let api_result = match api_result {
        Value::String(raw) => {
            decoded = serde_json::from_str::<Value>(raw)
                .map_err(|e| AppError::input(format!("Invalid JSON in 'api_result': {}", e)))?;
            &decoded
        },
        other => other,
    };

    let rows = api_result
        .as_array()
        .ok_or_else(|| AppError::input("'api_result' must be a list of records"))?;
    if rows.is_empty() {
        return Err(AppError::input("'api_result' contains no records"));
    }

    let code = parameter.code();
    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        let record = row
            .as_object()
            .ok_or_else(|| AppError::input("Each entry in 'api_result' must be an object"))?;
        match record.get(code) {
            None | Some(Value::Null) => continue,
            Some(value) => values.push(value.as_f64().ok_or_else(|| {
                AppError::input(format!("Non-numeric value for '{}': {}", code, value))
            })?),
        }
    }

    distribution(values, parameter).ok_or_else(|| missing_parameter(parameter))
}

/// Percentage of values falling into each category. `None` for an empty input.
pub fn distribution<I>(values: I, parameter: ClimateParameter) -> Option<CategoryDistribution>
where
    I: IntoIterator<Item = f64>,
{
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut total = 0usize;
    for value in values {
        *counts.entry(parameter.categorize(value)).or_default() += 1;
        total += 1;
    }

    if total == 0 {
        return None;
    }

    Some(
        counts
            .into_iter()
            .map(|(label, count)| (label.to_string(), count as f64 / total as f64 * 100.0))
            .collect(),
    )
}

fn missing_parameter(parameter: ClimateParameter) -> AppError {
    AppError::input(format!("Parameter '{}' not found in result set", parameter.code()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn record(day: u32, values: &[(&str, f64)]) -> DailyRecord {
        DailyRecord {
            longitude: 4.9,
            latitude: 52.37,
            elevation: 1.5,
            date: NaiveDate::from_ymd_opt(2023, 6, day).unwrap(),
            values: values.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    fn query(window_days: u32) -> ClimateQuery {
        ClimateQuery::new(
            52.37,
            4.9,
            NaiveDate::from_ymd_opt(2023, 6, 15).unwrap(),
            2000,
            2025,
            vec!["AOD_55_ADJ".to_string()],
            window_days,
        )
        .unwrap()
    }

    #[test]
    fn test_fetch_plan_echoes_window_bounds() {
        let plan = fetch_plan(&query(DEFAULT_WINDOW_DAYS)).unwrap();
        assert_eq!(
            plan,
            FetchPlan {
                start_year: 2000,
                end_year: 2025,
                month_start: 6,
                day_start: 10,
                month_end: 6,
                day_end: 20,
                parameters: vec!["AOD_55_ADJ".to_string()],
                lat: 52.37,
                lon: 4.9,
            }
        );
    }

    #[test]
    fn test_fetch_plan_crossing_month() {
        let mut q = query(5);
        q.target_date = NaiveDate::from_ymd_opt(2023, 3, 2).unwrap();
        let plan = fetch_plan(&q).unwrap();
        assert_eq!((plan.month_start, plan.day_start), (2, 25));
        assert_eq!((plan.month_end, plan.day_end), (3, 7));
    }

    #[test]
    fn test_distribution_percentages() {
        let dist = distribution([0.1, 0.2, 0.3, 0.9], ClimateParameter::Aod).unwrap();
        assert_eq!(dist.len(), 3);
        assert_eq!(dist["Clean"], 25.0);
        assert_eq!(dist["Moderate"], 50.0);
        assert_eq!(dist["Extremely Polluted"], 25.0);
        assert!(!dist.contains_key("Heavily Polluted"));
    }

    #[test]
    fn test_distribution_sums_to_hundred() {
        let values = [-12.0, -3.0, 0.0, 4.0, 12.5, 22.0, 36.0, 50.0, 7.0, 7.5, 8.0];
        let dist = distribution(values, ClimateParameter::Temperature).unwrap();
        let sum: f64 = dist.values().sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!(dist.values().all(|p| *p > 0.0));
    }

    #[test]
    fn test_distribution_empty_is_none() {
        assert!(distribution(Vec::new(), ClimateParameter::Wind).is_none());
    }

    #[test]
    fn test_distribution_from_records_requires_parameter() {
        let records = vec![record(14, &[("T2M", 18.0)]), record(15, &[("T2M", 19.0)])];

        let dist = distribution_from_records(&records, ClimateParameter::Temperature).unwrap();
        assert_eq!(dist["Mild (10°C to 20°C)"], 100.0);

        let err = distribution_from_records(&records, ClimateParameter::Snow).unwrap_err();
        assert!(matches!(err, AppError::Input(msg) if msg.contains("SNODP")));
    }

    #[test]
    fn test_distribution_from_result_array() {
        let body = json!({
            "api_result": [
                { "Date": "2023-06-14", "WS10M": 1.0 },
                { "Date": "2023-06-15", "WS10M": 3.0 },
                { "Date": "2023-06-16", "WS10M": 12.0 },
                { "Date": "2023-06-17", "WS10M": 4.5 }
            ]
        });

        let dist = distribution_from_result(&body, ClimateParameter::Wind).unwrap();
        assert_eq!(dist["Calm"], 25.0);
        assert_eq!(dist["Light Breeze"], 50.0);
        assert_eq!(dist["Strong Wind"], 25.0);
    }

    #[test]
    fn test_distribution_from_result_json_string() {
        let records = json!([
            { "PRECTOTCORR": 0.0 },
            { "PRECTOTCORR": 0.0 },
            { "PRECTOTCORR": 25.0 }
        ]);
        let body = json!({ "api_result": records.to_string() });

        let dist = distribution_from_result(&body, ClimateParameter::Rain).unwrap();
        assert!((dist["No Rain"] - 200.0 / 3.0).abs() < 1e-9);
        assert!((dist["Heavy Rain"] - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_distribution_from_result_skips_records_without_parameter() {
        let body = json!({
            "api_result": [{ "CLOUD_AMT": 10.0 }, { "T2M": 5.0 }, { "CLOUD_AMT": null }]
        });

        let dist = distribution_from_result(&body, ClimateParameter::Cloud).unwrap();
        assert_eq!(dist.len(), 1);
        assert_eq!(dist["Sunny"], 100.0);
    }

    #[test]
    fn test_distribution_from_result_errors() {
        let cases = [
            (json!({}), "Missing 'api_result' in request body"),
            (json!({ "api_result": [] }), "'api_result' contains no records"),
            (json!({ "api_result": "not json" }), "Invalid JSON in 'api_result'"),
            (json!({ "api_result": { "T2M": 1.0 } }), "'api_result' must be a list of records"),
            (json!({ "api_result": [1, 2] }), "Each entry in 'api_result' must be an object"),
            (json!({ "api_result": [{ "T2M": "warm" }] }), "Non-numeric value for 'T2M'"),
            (json!({ "api_result": [{ "WS10M": 1.0 }] }), "Parameter 'T2M' not found"),
            (json!(["T2M"]), "Missing 'api_result' in request body"),
        ];

        for (body, expected) in cases {
            match distribution_from_result(&body, ClimateParameter::Temperature) {
                Err(AppError::Input(msg)) => {
                    assert!(msg.contains(expected), "'{}' does not contain '{}'", msg, expected)
                },
                other => panic!("expected input error for {}, got {:?}", body, other),
            }
        }
    }

    #[test]
    fn test_posted_timeseries_matches_in_memory_distribution() {
        let records = vec![
            record(14, &[("AOD_55_ADJ", 0.12), ("T2M", 18.0)]),
            record(15, &[("AOD_55_ADJ", 0.40), ("T2M", 21.0)]),
            record(16, &[("AOD_55_ADJ", 0.41), ("T2M", 22.0)]),
        ];
        let body = json!({ "api_result": serde_json::to_value(&records).unwrap() });

        for parameter in [ClimateParameter::Aod, ClimateParameter::Temperature] {
            assert_eq!(
                distribution_from_result(&body, parameter).unwrap(),
                distribution_from_records(&records, parameter).unwrap()
            );
        }
    }
}
