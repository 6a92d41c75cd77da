//! Coverage checks run after a deal is added.
//!
//! The whole deal collection is re-aggregated per day and joined against the
//! forecast. Findings are informational only; nothing here blocks or undoes
//! an insertion.

use crate::domain::store::RecordStore;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageDay {
    pub date: NaiveDate,
    /// Zero when no forecast exists for the day.
    pub forecast: f64,
    pub total_volume: f64,
    /// `forecast - total_volume`.
    pub remaining: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageReport {
    /// Days where contracted volume exceeds forecast.
    pub over: Vec<CoverageDay>,
    /// Days with deals but no (or zero) forecast. May overlap `over`.
    pub missing: Vec<CoverageDay>,
}

impl CoverageReport {
    pub fn is_clean(&self) -> bool {
        self.over.is_empty() && self.missing.is_empty()
    }
}

pub fn check_coverage(store: &RecordStore) -> CoverageReport {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in store.deals() {
        *totals.entry(row.date).or_default() += row.volume_gj_per_day;
    }

    let mut report = CoverageReport::default();
    for (date, total_volume) in totals {
        let forecast = store.forecast_on(date).unwrap_or(0.0);
        let day = CoverageDay {
            date,
            forecast,
            total_volume,
            remaining: forecast - total_volume,
        };
        if forecast == 0.0 {
            report.missing.push(day.clone());
        }
        if day.remaining < 0.0 {
            report.over.push(day);
        }
    }
    report
}
