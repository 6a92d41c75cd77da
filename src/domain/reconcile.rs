//! Daily reconciliation of executed deals against forecast consumption.
//!
//! For each day in a window the engine sums deal volume per [`DealType`],
//! totals it, and compares the total with the forecast:
//!
//! ```text
//! position = total - forecast
//! ```
//!
//! Days present on only one side take zero for the other. Missing forecast is
//! never estimated.

use crate::domain::deal::DealType;
use crate::domain::store::RecordStore;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// Positions within this distance of zero are balanced.
pub const BALANCE_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    Long,
    Short,
    Balanced,
}

impl PositionStatus {
    pub fn classify(position: f64) -> Self {
        if position > BALANCE_TOLERANCE {
            PositionStatus::Long
        } else if position < -BALANCE_TOLERANCE {
            PositionStatus::Short
        } else {
            PositionStatus::Balanced
        }
    }
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PositionStatus::Long => "Long",
            PositionStatus::Short => "Short",
            PositionStatus::Balanced => "Balanced",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyPosition {
    pub date: NaiveDate,
    /// Executed GJ per deal type; every type is present, zero if unused.
    pub by_type: BTreeMap<DealType, f64>,
    pub total: f64,
    pub forecast: f64,
    pub position: f64,
    pub status: PositionStatus,
}

impl DailyPosition {
    pub fn volume(&self, deal_type: DealType) -> f64 {
        self.by_type.get(&deal_type).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconciliationSummary {
    pub total_forecast: f64,
    pub total_executed: f64,
    /// `None` when total forecast is zero.
    pub pct_difference: Option<f64>,
}

impl ReconciliationSummary {
    pub fn from_days(days: &[DailyPosition]) -> Self {
        let total_forecast: f64 = days.iter().map(|d| d.forecast).sum();
        let total_executed: f64 = days.iter().map(|d| d.total).sum();
        let pct_difference = if total_forecast != 0.0 {
            Some((total_executed - total_forecast) / total_forecast * 100.0)
        } else {
            None
        };
        Self {
            total_forecast,
            total_executed,
            pct_difference,
        }
    }

    /// Percent difference to one decimal, or `n/a`.
    pub fn pct_difference_display(&self) -> String {
        match self.pct_difference {
            Some(p) => format!("{p:.1}%"),
            None => "n/a".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub days: Vec<DailyPosition>,
    pub summary: ReconciliationSummary,
}

/// Window spanning the whole forecast collection.
pub fn default_window(store: &RecordStore) -> Option<(NaiveDate, NaiveDate)> {
    store.forecast_range()
}

/// Reconcile every day in the inclusive window `[start, end]` that has a
/// forecast or at least one deal row. An inverted window yields no days.
pub fn reconcile(store: &RecordStore, start: NaiveDate, end: NaiveDate) -> Reconciliation {
    let in_window = |d: NaiveDate| d >= start && d <= end;

    let mut executed: BTreeMap<NaiveDate, BTreeMap<DealType, f64>> = BTreeMap::new();
    for row in store.deals().iter().filter(|r| in_window(r.date)) {
        *executed
            .entry(row.date)
            .or_default()
            .entry(row.deal_type)
            .or_default() += row.volume_gj_per_day;
    }

    let mut dates: Vec<NaiveDate> = store
        .forecast_map()
        .keys()
        .copied()
        .filter(|d| in_window(*d))
        .chain(executed.keys().copied())
        .collect();
    dates.sort_unstable();
    dates.dedup();

    let days: Vec<DailyPosition> = dates
        .into_iter()
        .map(|date| {
            let mut by_type: BTreeMap<DealType, f64> =
                DealType::ALL.iter().map(|t| (*t, 0.0)).collect();
            if let Some(volumes) = executed.get(&date) {
                for (t, v) in volumes {
                    by_type.insert(*t, *v);
                }
            }
            let total: f64 = by_type.values().sum();
            let forecast = store.forecast_on(date).unwrap_or(0.0);
            let position = total - forecast;
            DailyPosition {
                date,
                by_type,
                total,
                forecast,
                position,
                status: PositionStatus::classify(position),
            }
        })
        .collect();

    let summary = ReconciliationSummary::from_days(&days);
    Reconciliation { days, summary }
}
