//! In-memory working copy of the forecast and deal collections.

use crate::domain::deal::{expand_deal, validate_terms, DealHeader, DealKey, DealRecord};
use crate::domain::error::GasbookError;
use crate::domain::forecast::ForecastRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Records that survived a load or upload, plus how many rows were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport<T> {
    pub records: Vec<T>,
    pub dropped: usize,
}

impl<T> LoadReport<T> {
    pub fn new(records: Vec<T>, dropped: usize) -> Self {
        Self { records, dropped }
    }
}

impl<T> Default for LoadReport<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            dropped: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeSummary {
    pub added: usize,
    pub replaced: usize,
    pub dropped: usize,
}

/// A distinct (start, end, supplier) group and how many daily rows it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealGroup {
    pub key: DealKey,
    pub rows: usize,
}

impl DealGroup {
    pub fn label(&self) -> String {
        self.key.to_string()
    }
}

/// Forecasts keyed by date (unique) and deal rows in insertion order (never
/// deduplicated).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    forecasts: BTreeMap<NaiveDate, f64>,
    deals: Vec<DealRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loaded collections. Later forecasts win on
    /// duplicate dates.
    pub fn from_records(forecasts: Vec<ForecastRecord>, deals: Vec<DealRecord>) -> Self {
        let mut store = Self {
            forecasts: BTreeMap::new(),
            deals,
        };
        for rec in forecasts {
            store.upsert_forecast(rec);
        }
        store
    }

    pub fn forecast_count(&self) -> usize {
        self.forecasts.len()
    }

    pub fn deal_count(&self) -> usize {
        self.deals.len()
    }

    pub fn forecast_on(&self, date: NaiveDate) -> Option<f64> {
        self.forecasts.get(&date).copied()
    }

    /// Forecasts sorted ascending by date.
    pub fn forecasts(&self) -> Vec<ForecastRecord> {
        self.forecasts
            .iter()
            .map(|(&date, &v)| ForecastRecord::new(date, v))
            .collect()
    }

    pub(crate) fn forecast_map(&self) -> &BTreeMap<NaiveDate, f64> {
        &self.forecasts
    }

    pub fn deals(&self) -> &[DealRecord] {
        &self.deals
    }

    /// Earliest and latest forecast dates.
    pub fn forecast_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.forecasts.keys().next()?;
        let last = self.forecasts.keys().next_back()?;
        Some((*first, *last))
    }

    /// Insert or replace the forecast for `record.date`. Returns the value it
    /// replaced, if any. The value is stored as given; see
    /// [`ForecastRecord::validate`].
    pub fn upsert_forecast(&mut self, record: ForecastRecord) -> Option<f64> {
        self.forecasts
            .insert(record.date, record.forecast_consumption)
    }

    /// Merge an uploaded batch. Rows are applied in order so the last row for
    /// a date wins, both against existing data and within the batch.
    pub fn merge_forecasts(&mut self, upload: LoadReport<ForecastRecord>) -> MergeSummary {
        let mut summary = MergeSummary {
            dropped: upload.dropped,
            ..MergeSummary::default()
        };
        let mut seen_in_batch = std::collections::HashSet::new();

        for rec in upload.records {
            let date = rec.date;
            let existed = self.upsert_forecast(rec).is_some();
            // A date repeated inside the batch counts once.
            if seen_in_batch.insert(date) {
                if existed {
                    summary.replaced += 1;
                } else {
                    summary.added += 1;
                }
            }
        }
        summary
    }

    /// Expand `header` and append its rows. Nothing is appended on error.
    pub fn append_deal(&mut self, header: &DealHeader) -> Result<Vec<DealRecord>, GasbookError> {
        let rows = expand_deal(header)?;
        self.deals.extend(rows.iter().cloned());
        Ok(rows)
    }

    /// Distinct deal groups, sorted by key. Rows without a complete range
    /// belong to no group.
    pub fn deal_groups(&self) -> Vec<DealGroup> {
        let mut counts: BTreeMap<DealKey, usize> = BTreeMap::new();
        for key in self.deals.iter().filter_map(DealRecord::key) {
            *counts.entry(key).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(key, rows)| DealGroup { key, rows })
            .collect()
    }

    pub fn deal_rows(&self, key: &DealKey) -> Vec<&DealRecord> {
        self.deals.iter().filter(|r| r.matches(key)).collect()
    }

    /// Set volume and price on every row sharing `key`. Returns the number of
    /// rows changed.
    pub fn edit_deal_group(
        &mut self,
        key: &DealKey,
        volume_gj_per_day: f64,
        price: f64,
    ) -> Result<usize, GasbookError> {
        validate_terms(volume_gj_per_day, price)?;
        let mut changed = 0;
        for row in self.deals.iter_mut().filter(|r| r.matches(key)) {
            row.volume_gj_per_day = volume_gj_per_day;
            row.price = price;
            changed += 1;
        }
        if changed == 0 {
            return Err(GasbookError::DealNotFound {
                supplier: key.supplier.clone(),
                start_date: key.start_date.to_string(),
                end_date: key.end_date.to_string(),
            });
        }
        Ok(changed)
    }
}
