//! Gas-week action plans.
//!
//! A gas week runs Saturday through Friday. For each day of a week the plan
//! reports what to transact:
//!
//! ```text
//! action = forecast - total_deals
//! ```
//!
//! This is the negation of the reconciliation position. The two are kept
//! separate on purpose: one answers "are we covered", the other "what do we
//! buy or sell".

use crate::domain::dates::{is_saturday, saturday_on_or_before, saturdays_between};
use crate::domain::error::GasbookError;
use crate::domain::store::RecordStore;
use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GasWeek {
    start: NaiveDate,
}

impl GasWeek {
    /// The week starting on `saturday`.
    pub fn starting(saturday: NaiveDate) -> Result<Self, GasbookError> {
        if !is_saturday(saturday) {
            return Err(GasbookError::validation(format!(
                "gas week must start on a Saturday, {saturday} is a {}",
                chrono::Datelike::weekday(&saturday)
            )));
        }
        Ok(Self { start: saturday })
    }

    /// The week that contains `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            start: saturday_on_or_before(date),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// The Friday closing the week.
    pub fn end(&self) -> NaiveDate {
        self.start + Days::new(6)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    pub fn next(&self) -> Self {
        Self {
            start: self.start + Days::new(7),
        }
    }
}

impl fmt::Display for GasWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Suggestion {
    Buy(f64),
    Sell(f64),
    Balanced,
}

impl Suggestion {
    /// Exact comparison against zero; no tolerance band at this layer.
    pub fn from_action(action: f64) -> Self {
        if action > 0.0 {
            Suggestion::Buy(action)
        } else if action < 0.0 {
            Suggestion::Sell(action.abs())
        } else {
            Suggestion::Balanced
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::Buy(gj) => write!(f, "Buy {gj:.1} GJ"),
            Suggestion::Sell(gj) => write!(f, "Sell {gj:.1} GJ"),
            Suggestion::Balanced => f.write_str("Balanced"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyAction {
    pub date: NaiveDate,
    pub forecast: f64,
    pub total_deals: f64,
    pub action: f64,
    pub suggestion: Suggestion,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyPlan {
    pub week: GasWeek,
    pub days: Vec<WeeklyAction>,
}

/// Per-day actions for `week`, over the days that have a forecast or a deal.
pub fn weekly_plan(store: &RecordStore, week: GasWeek) -> WeeklyPlan {
    let mut totals: BTreeMap<NaiveDate, f64> = store
        .forecast_map()
        .range(week.start()..=week.end())
        .map(|(&date, _)| (date, 0.0))
        .collect();

    for row in store.deals().iter().filter(|r| week.contains(r.date)) {
        *totals.entry(row.date).or_default() += row.volume_gj_per_day;
    }

    let days = totals
        .into_iter()
        .map(|(date, total_deals)| {
            let forecast = store.forecast_on(date).unwrap_or(0.0);
            let action = forecast - total_deals;
            WeeklyAction {
                date,
                forecast,
                total_deals,
                action,
                suggestion: Suggestion::from_action(action),
            }
        })
        .collect();

    WeeklyPlan { week, days }
}

/// Weeks offered for selection: every Saturday in the forecast range, the
/// week containing `today`, and optionally the week after it. Sorted, no
/// duplicates.
pub fn available_weeks(store: &RecordStore, today: NaiveDate, preview_next: bool) -> Vec<GasWeek> {
    let current = GasWeek::containing(today);

    let mut weeks: Vec<GasWeek> = match store.forecast_range() {
        Some((first, last)) => saturdays_between(first, last)
            .into_iter()
            .map(|start| GasWeek { start })
            .collect(),
        None => Vec::new(),
    };
    weeks.push(current);
    if preview_next {
        weeks.push(current.next());
    }

    weeks.sort_unstable();
    weeks.dedup();
    weeks
}
