//! A working session: the in-memory record store plus a persistence policy.
//!
//! The store is the source of truth for the whole session. Every mutation is
//! applied in memory first; when persistence is enabled the changed
//! collection is then written through the [`RecordPort`]. A failed write is
//! logged and reported in the outcome but never undoes the mutation and is
//! not retried.

use crate::domain::coverage::{check_coverage, CoverageReport};
use crate::domain::deal::{DealHeader, DealKey, DealRecord};
use crate::domain::error::GasbookError;
use crate::domain::forecast::ForecastRecord;
use crate::domain::reconcile::{default_window, reconcile, Reconciliation};
use crate::domain::store::{LoadReport, MergeSummary, RecordStore};
use crate::domain::weekly::{available_weeks, weekly_plan, GasWeek, WeeklyPlan};
use crate::ports::record_port::RecordPort;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Persistence is disabled; the change lives only in memory.
    Skipped,
    Saved,
    Failed(String),
}

impl PersistOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, PersistOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenReport {
    pub dropped_forecasts: usize,
    pub dropped_deals: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastUpdate {
    pub replaced: Option<f64>,
    pub persistence: PersistOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    pub merge: MergeSummary,
    pub persistence: PersistOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DealEntryOutcome {
    pub rows: Vec<DealRecord>,
    pub coverage: CoverageReport,
    pub persistence: PersistOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DealEditOutcome {
    pub rows_changed: usize,
    pub persistence: PersistOutcome,
}

pub struct Session<'a> {
    store: RecordStore,
    port: &'a dyn RecordPort,
    persist: bool,
}

impl<'a> Session<'a> {
    pub fn new(store: RecordStore, port: &'a dyn RecordPort, persist: bool) -> Self {
        Self {
            store,
            port,
            persist,
        }
    }

    /// Load both collections through `port`.
    pub fn open(port: &'a dyn RecordPort, persist: bool) -> Result<(Self, OpenReport), GasbookError> {
        let forecasts = port.load_forecasts()?;
        let deals = port.load_deals()?;
        let report = OpenReport {
            dropped_forecasts: forecasts.dropped,
            dropped_deals: deals.dropped,
        };
        if report.dropped_forecasts > 0 || report.dropped_deals > 0 {
            warn!(
                dropped_forecasts = report.dropped_forecasts,
                dropped_deals = report.dropped_deals,
                "dropped unparseable rows on load"
            );
        }
        let store = RecordStore::from_records(forecasts.records, deals.records);
        info!(
            forecasts = store.forecast_count(),
            deals = store.deal_count(),
            persist,
            "session opened"
        );
        Ok((Self::new(store, port, persist), report))
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn persists(&self) -> bool {
        self.persist
    }

    pub fn add_forecast(&mut self, record: ForecastRecord) -> Result<ForecastUpdate, GasbookError> {
        record.validate()?;
        debug!(date = %record.date, value = record.forecast_consumption, "upsert forecast");
        let replaced = self.store.upsert_forecast(record);
        Ok(ForecastUpdate {
            replaced,
            persistence: self.persist_forecasts(),
        })
    }

    /// Merge an already-parsed upload. Schema problems are caught when the
    /// upload is parsed, so nothing reaches here unless the whole file is
    /// acceptable.
    pub fn upload_forecasts(&mut self, upload: LoadReport<ForecastRecord>) -> UploadOutcome {
        let merge = self.store.merge_forecasts(upload);
        info!(
            added = merge.added,
            replaced = merge.replaced,
            dropped = merge.dropped,
            "forecast upload merged"
        );
        UploadOutcome {
            merge,
            persistence: self.persist_forecasts(),
        }
    }

    /// Expand and append a deal, then check coverage across all deals.
    pub fn add_deal(&mut self, header: &DealHeader) -> Result<DealEntryOutcome, GasbookError> {
        let rows = self.store.append_deal(header)?;
        info!(deal = %header.key(), rows = rows.len(), "deal added");

        let coverage = check_coverage(&self.store);
        if !coverage.over.is_empty() {
            warn!(days = coverage.over.len(), "contracted volume exceeds forecast");
        }

        Ok(DealEntryOutcome {
            rows,
            coverage,
            persistence: self.persist_deals(),
        })
    }

    pub fn edit_deal(
        &mut self,
        key: &DealKey,
        volume_gj_per_day: f64,
        price: f64,
    ) -> Result<DealEditOutcome, GasbookError> {
        let rows_changed = self.store.edit_deal_group(key, volume_gj_per_day, price)?;
        info!(deal = %key, rows = rows_changed, "deal edited");
        Ok(DealEditOutcome {
            rows_changed,
            persistence: self.persist_deals(),
        })
    }

    /// Reconcile over `window`, or over the forecast range when `None`.
    /// Returns `None` only when no window is given and there is no forecast.
    pub fn reconcile(&self, window: Option<(NaiveDate, NaiveDate)>) -> Option<Reconciliation> {
        let (start, end) = window.or_else(|| default_window(&self.store))?;
        Some(reconcile(&self.store, start, end))
    }

    pub fn weekly_plan(&self, week: GasWeek) -> WeeklyPlan {
        weekly_plan(&self.store, week)
    }

    pub fn available_weeks(&self, today: NaiveDate, preview_next: bool) -> Vec<GasWeek> {
        available_weeks(&self.store, today, preview_next)
    }

    fn persist_forecasts(&self) -> PersistOutcome {
        if !self.persist {
            return PersistOutcome::Skipped;
        }
        Self::outcome(self.port.save_forecasts(&self.store.forecasts()))
    }

    fn persist_deals(&self) -> PersistOutcome {
        if !self.persist {
            return PersistOutcome::Skipped;
        }
        Self::outcome(self.port.save_deals(self.store.deals()))
    }

    fn outcome(result: Result<(), GasbookError>) -> PersistOutcome {
        match result {
            Ok(()) => PersistOutcome::Saved,
            Err(e) => {
                warn!(error = %e, "persistence failed; keeping in-memory changes");
                PersistOutcome::Failed(e.to_string())
            }
        }
    }
}
