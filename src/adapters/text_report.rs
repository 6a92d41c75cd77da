//! Plain-text tables for terminal output.
//!
//! Provides functions to format:
//! - Daily reconciliation with a summary footer
//! - Weekly action plan
//! - Coverage warnings after a deal is added
//! - Forecast listing in GJ or m³
//! - Deal groups

use crate::domain::coverage::CoverageReport;
use crate::domain::deal::DealType;
use crate::domain::forecast::ForecastRecord;
use crate::domain::reconcile::Reconciliation;
use crate::domain::store::DealGroup;
use crate::domain::units::VolumeUnit;
use crate::domain::weekly::{GasWeek, WeeklyPlan};

pub fn format_reconciliation(rec: &Reconciliation) -> String {
    let mut out = String::new();
    if rec.days.is_empty() {
        out.push_str("No forecast or deal data in the selected range.\n");
    } else {
        out.push_str(&format!("{:<12}", "Date"));
        for t in DealType::ALL {
            out.push_str(&format!("{:>12}", t.as_str()));
        }
        out.push_str(&format!(
            "{:>12}{:>12}{:>12}  {}\n",
            "Total", "Forecast", "Long/Short", "Status"
        ));

        for day in &rec.days {
            out.push_str(&format!("{:<12}", day.date.to_string()));
            for t in DealType::ALL {
                out.push_str(&format!("{:>12.0}", day.volume(t)));
            }
            out.push_str(&format!(
                "{:>12.0}{:>12.0}{:>12.0}  {}\n",
                day.total, day.forecast, day.position, day.status
            ));
        }
        out.push('\n');
    }

    let s = &rec.summary;
    out.push_str(&format!("Total Forecasted: {} GJ\n", group_thousands(s.total_forecast)));
    out.push_str(&format!("Total Executed:   {} GJ\n", group_thousands(s.total_executed)));
    out.push_str(&format!("% Difference:     {}\n", s.pct_difference_display()));
    out
}

pub fn format_weekly_plan(plan: &WeeklyPlan) -> String {
    let mut out = format!("Action plan for {}\n", plan.week);
    if plan.days.is_empty() {
        out.push_str("No forecast or deal data for this week.\n");
        return out;
    }
    out.push_str(&format!(
        "{:<12}{:>12}{:>12}{:>12}  {}\n",
        "Date", "Forecast", "Deals", "Action", "Suggestion"
    ));
    for a in &plan.days {
        out.push_str(&format!(
            "{:<12}{:>12.1}{:>12.1}{:>12.1}  {}\n",
            a.date.to_string(),
            a.forecast,
            a.total_deals,
            a.action,
            a.suggestion
        ));
    }
    out
}

pub fn format_weeks(weeks: &[GasWeek], selected: GasWeek) -> String {
    let mut out = String::new();
    for w in weeks {
        let marker = if *w == selected { "*" } else { " " };
        out.push_str(&format!("{marker} {w}\n"));
    }
    out
}

pub fn format_coverage(report: &CoverageReport) -> String {
    let mut out = String::new();
    if report.is_clean() {
        out.push_str("Deal saved with no coverage warnings.\n");
        return out;
    }
    if !report.over.is_empty() {
        out.push_str(&format!(
            "warning: total contracted volume exceeds forecast on {} day(s)\n",
            report.over.len()
        ));
        for c in &report.over {
            out.push_str(&format!(
                "  {}  forecast {:.1}  contracted {:.1}  remaining {:.1}\n",
                c.date, c.forecast, c.total_volume, c.remaining
            ));
        }
    }
    if !report.missing.is_empty() {
        out.push_str(&format!(
            "note: forecast missing for {} day(s); treated as 0 GJ\n",
            report.missing.len()
        ));
        for c in &report.missing {
            out.push_str(&format!("  {}  contracted {:.1}\n", c.date, c.total_volume));
        }
    }
    out
}

pub fn format_forecasts(records: &[ForecastRecord], unit: VolumeUnit) -> String {
    let mut out = String::new();
    if records.is_empty() {
        out.push_str("No forecast data available.\n");
        return out;
    }
    let header = format!("Forecast ({unit})");
    out.push_str(&format!("{:<12}{:>20}\n", "Date", header));
    for r in records {
        out.push_str(&format!(
            "{:<12}{:>20.1}\n",
            r.date.to_string(),
            unit.from_gj(r.forecast_consumption)
        ));
    }
    out
}

pub fn format_deal_groups(groups: &[DealGroup]) -> String {
    let mut out = String::new();
    if groups.is_empty() {
        out.push_str("No deals found.\n");
        return out;
    }
    for g in groups {
        out.push_str(&format!("{}  [{} day(s)]\n", g.label(), g.rows));
    }
    out
}

/// Round to whole units and insert thousands separators.
fn group_thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0.0 && rounded != "0" {
        format!("-{grouped}")
    } else {
        grouped
    }
}
