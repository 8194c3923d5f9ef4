//! Builds the per-year date ranges sampled around a target calendar day.
//!
//! A window is centred on the target date, then only its month/day bounds are
//! carried over to every year of the requested range. Years where a bound does
//! not exist (Feb 29 outside leap years) are skipped, as are years outside the
//! four-digit calendar the provider accepts.

use crate::error::{AppError, Result};
use chrono::{Datelike, Days, NaiveDate};
use std::ops::RangeInclusive;
use tracing::debug;

/// Years that can be written as the provider's `YYYYMMDD` date parameters.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1..=9999;

/// The `target ± window_days` span, anchored on the target's own year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A window re-applied to a single year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub year: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Creates the window `[target - window_days, target + window_days]`.
    pub fn around(target: NaiveDate, window_days: u32) -> Result<Self> {
        let days = Days::new(u64::from(window_days));
        let out_of_range =
            || AppError::input(format!("Window of {} days is out of range", window_days));
        let start = target.checked_sub_days(days).ok_or_else(out_of_range)?;
        let end = target.checked_add_days(days).ok_or_else(out_of_range)?;
        Ok(Self { start, end })
    }

    /// (month, day) of the window start.
    pub fn start_month_day(&self) -> (u32, u32) {
        (self.start.month(), self.start.day())
    }

    /// (month, day) of the window end.
    pub fn end_month_day(&self) -> (u32, u32) {
        (self.end.month(), self.end.day())
    }

    /// Re-applies the window's month/day bounds to `year`.
    ///
    /// Returns `None` when either bound does not exist in that year, or the year
    /// is outside `SUPPORTED_YEARS`.
    pub fn for_year(&self, year: i32) -> Option<YearRange> {
        if !SUPPORTED_YEARS.contains(&year) {
            return None;
        }
        let (start_month, start_day) = self.start_month_day();
        let (end_month, end_day) = self.end_month_day();
        let start = NaiveDate::from_ymd_opt(year, start_month, start_day)?;
        let end = NaiveDate::from_ymd_opt(year, end_month, end_day)?;
        Some(YearRange { year, start, end })
    }

    /// Per-year ranges for every year in `[start_year, end_year]`, in order.
    pub fn year_ranges(&self, start_year: i32, end_year: i32) -> Vec<YearRange> {
        let first = start_year.max(*SUPPORTED_YEARS.start());
        let last = end_year.min(*SUPPORTED_YEARS.end());
        if (first, last) != (start_year, end_year) {
            debug!(
                "Years {}..={} clamped to {}..={}",
                start_year, end_year, first, last
            );
        }

        (first..=last)
            .filter_map(|year| {
                let range = self.for_year(year);
                if range.is_none() {
                    debug!("Skipping year {}: window bounds do not exist in that year", year);
                }
                range
            })
            .collect()
    }
}

impl YearRange {
    /// Start date in the provider's `YYYYMMDD` format.
    pub fn start_param(&self) -> String {
        self.start.format("%Y%m%d").to_string()
    }

    /// End date in the provider's `YYYYMMDD` format.
    pub fn end_param(&self) -> String {
        self.end.format("%Y%m%d").to_string()
    }
}
