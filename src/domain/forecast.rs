//! Daily consumption forecast records.

use crate::domain::error::GasbookError;
use chrono::{Datelike, NaiveDate};

/// One forecast day. `date` is the unique key within a forecast collection.
///
/// Year, month and day are projections of `date` and are computed on demand
/// rather than stored, so they can never drift from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    /// GJ/day.
    pub forecast_consumption: f64,
}

impl ForecastRecord {
    pub fn new(date: NaiveDate, forecast_consumption: f64) -> Self {
        Self {
            date,
            forecast_consumption,
        }
    }

    /// Consumption must be finite and non-negative.
    pub fn validate(&self) -> Result<(), GasbookError> {
        if !self.forecast_consumption.is_finite() || self.forecast_consumption < 0.0 {
            return Err(GasbookError::validation(format!(
                "forecast consumption for {} must be a non-negative number, got {}",
                self.date, self.forecast_consumption
            )));
        }
        Ok(())
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }
}
