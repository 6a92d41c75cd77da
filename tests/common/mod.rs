#![allow(dead_code)]

use chrono::NaiveDate;
use gasbook::domain::deal::{expand_deal, DealHeader, DealRecord, DealType};
use gasbook::domain::error::GasbookError;
use gasbook::domain::forecast::ForecastRecord;
use gasbook::domain::store::LoadReport;
use gasbook::ports::record_port::RecordPort;
use std::cell::{Cell, RefCell};

/// In-memory record port with optional write failure.
#[derive(Default)]
pub struct MockRecordPort {
    pub forecasts: Vec<ForecastRecord>,
    pub deals: Vec<DealRecord>,
    pub dropped_on_load: usize,
    pub fail_writes: bool,
    pub saved_forecasts: RefCell<Option<Vec<ForecastRecord>>>,
    pub saved_deals: RefCell<Option<Vec<DealRecord>>>,
    pub save_attempts: Cell<usize>,
}

impl MockRecordPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_forecast(mut self, date: NaiveDate, value: f64) -> Self {
        self.forecasts.push(ForecastRecord::new(date, value));
        self
    }

    pub fn with_deal(mut self, header: DealHeader) -> Self {
        self.deals.extend(expand_deal(&header).unwrap());
        self
    }

    pub fn with_dropped(mut self, n: usize) -> Self {
        self.dropped_on_load = n;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    fn write_result(&self, path: &str) -> Result<(), GasbookError> {
        self.save_attempts.set(self.save_attempts.get() + 1);
        if self.fail_writes {
            return Err(GasbookError::Persistence {
                path: path.into(),
                reason: "permission denied".into(),
            });
        }
        Ok(())
    }
}

impl RecordPort for MockRecordPort {
    fn load_forecasts(&self) -> Result<LoadReport<ForecastRecord>, GasbookError> {
        Ok(LoadReport::new(self.forecasts.clone(), self.dropped_on_load))
    }

    fn load_deals(&self) -> Result<LoadReport<DealRecord>, GasbookError> {
        Ok(LoadReport::new(self.deals.clone(), 0))
    }

    fn save_forecasts(&self, records: &[ForecastRecord]) -> Result<(), GasbookError> {
        self.write_result("forecast.csv")?;
        *self.saved_forecasts.borrow_mut() = Some(records.to_vec());
        Ok(())
    }

    fn save_deals(&self, records: &[DealRecord]) -> Result<(), GasbookError> {
        self.write_result("deals.csv")?;
        *self.saved_deals.borrow_mut() = Some(records.to_vec());
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_deal(
    start: NaiveDate,
    end: NaiveDate,
    deal_type: DealType,
    volume: f64,
    supplier: &str,
) -> DealHeader {
    DealHeader {
        start_date: start,
        end_date: end,
        deal_type,
        volume_gj_per_day: volume,
        price: 3.10,
        supplier: supplier.to_string(),
        delivery_point: "DAWN".to_string(),
    }
}
