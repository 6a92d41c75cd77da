//! CSV file record adapter.
//!
//! Persisted layout, one file per collection under `base_path`:
//!
//! - `forecast.csv`: `date,year,month,day,forecast_consumption`
//! - `deals.csv`: `start_date,end_date,deal_type,volume_gj_per_day,price,supplier,delivery_point,date`
//!
//! Uploaded forecasts use display headers instead (`Date`,
//! `Forecast Consumption`); see [`read_forecast_upload`].

use crate::domain::dates::parse_date_lenient;
use crate::domain::deal::{DealRecord, DealType};
use crate::domain::error::GasbookError;
use crate::domain::forecast::ForecastRecord;
use crate::domain::store::LoadReport;
use crate::ports::record_port::RecordPort;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const FORECAST_FILE: &str = "forecast.csv";
pub const DEALS_FILE: &str = "deals.csv";

pub const UPLOAD_DATE_COLUMN: &str = "Date";
pub const UPLOAD_FORECAST_COLUMN: &str = "Forecast Consumption";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ForecastRow {
    date: Option<String>,
    forecast_consumption: Option<String>,
}

#[derive(Debug, Serialize)]
struct ForecastOutRow {
    date: NaiveDate,
    year: i32,
    month: u32,
    day: u32,
    forecast_consumption: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DealRow {
    start_date: Option<String>,
    end_date: Option<String>,
    deal_type: Option<String>,
    volume_gj_per_day: Option<String>,
    price: Option<String>,
    supplier: Option<String>,
    delivery_point: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Serialize)]
struct DealOutRow<'a> {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    deal_type: &'a str,
    volume_gj_per_day: f64,
    price: f64,
    supplier: &'a str,
    delivery_point: &'a str,
    date: NaiveDate,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn forecast_path(&self) -> PathBuf {
        self.base_path.join(FORECAST_FILE)
    }

    pub fn deals_path(&self) -> PathBuf {
        self.base_path.join(DEALS_FILE)
    }

    /// Write to a sibling temp file, then rename over the target so a failed
    /// write never leaves a truncated file behind.
    fn write_atomically<F>(&self, target: &Path, write: F) -> Result<(), GasbookError>
    where
        F: FnOnce(&mut fs::File) -> Result<(), GasbookError>,
    {
        let persistence = |e: &dyn std::fmt::Display| GasbookError::Persistence {
            path: target.display().to_string(),
            reason: e.to_string(),
        };

        fs::create_dir_all(&self.base_path).map_err(|e| persistence(&e))?;
        let tmp = target.with_extension("csv.tmp");
        let mut file = fs::File::create(&tmp).map_err(|e| persistence(&e))?;
        if let Err(e) = write(&mut file) {
            let _ = fs::remove_file(&tmp);
            return Err(persistence(&e));
        }
        if let Err(e) = file.sync_all().and_then(|()| fs::rename(&tmp, target)) {
            let _ = fs::remove_file(&tmp);
            return Err(persistence(&e));
        }
        debug!(path = %target.display(), "saved");
        Ok(())
    }
}

fn parse_volume(value: Option<&str>) -> Option<f64> {
    value?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn forecast_from_parts(date: Option<&str>, value: Option<&str>) -> Option<ForecastRecord> {
    let date = parse_date_lenient(date?)?;
    let value = parse_volume(value).filter(|v| *v >= 0.0)?;
    Some(ForecastRecord::new(date, value))
}

fn deal_from_row(row: DealRow) -> Option<DealRecord> {
    let date = parse_date_lenient(row.date.as_deref()?)?;
    let deal_type: DealType = row.deal_type.as_deref()?.parse().ok()?;
    Some(DealRecord {
        date,
        deal_type,
        volume_gj_per_day: parse_volume(row.volume_gj_per_day.as_deref())?,
        price: parse_volume(row.price.as_deref())?,
        supplier: row.supplier.unwrap_or_default(),
        delivery_point: row.delivery_point.unwrap_or_default(),
        start_date: row.start_date.as_deref().and_then(parse_date_lenient),
        end_date: row.end_date.as_deref().and_then(parse_date_lenient),
    })
}

/// Read persisted forecast rows. Rows with an unparseable date or value are
/// dropped and counted.
pub fn read_forecasts<R: Read>(reader: R) -> Result<LoadReport<ForecastRecord>, GasbookError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut report = LoadReport::default();

    for result in rdr.deserialize::<ForecastRow>() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                debug!(error = %e, "skipping malformed forecast row");
                report.dropped += 1;
                continue;
            }
        };
        match forecast_from_parts(row.date.as_deref(), row.forecast_consumption.as_deref()) {
            Some(rec) => report.records.push(rec),
            None => report.dropped += 1,
        }
    }
    Ok(report)
}

/// Read persisted deal rows. The four date columns parse independently: a
/// bad `date` drops the row, a bad `start_date`/`end_date` only clears that
/// field.
pub fn read_deals<R: Read>(reader: R) -> Result<LoadReport<DealRecord>, GasbookError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut report = LoadReport::default();

    for result in rdr.deserialize::<DealRow>() {
        match result.ok().and_then(deal_from_row) {
            Some(rec) => report.records.push(rec),
            None => report.dropped += 1,
        }
    }
    Ok(report)
}

/// Parse an uploaded forecast file with `Date` and `Forecast Consumption`
/// columns. Column names are matched exactly; other columns are ignored.
pub fn read_forecast_upload<R: Read>(reader: R) -> Result<LoadReport<ForecastRecord>, GasbookError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let date_idx = headers.iter().position(|h| h == UPLOAD_DATE_COLUMN);
    let value_idx = headers.iter().position(|h| h == UPLOAD_FORECAST_COLUMN);
    let (date_idx, value_idx) = match (date_idx, value_idx) {
        (Some(d), Some(v)) => (d, v),
        _ => {
            let missing: Vec<String> = [
                (date_idx, UPLOAD_DATE_COLUMN),
                (value_idx, UPLOAD_FORECAST_COLUMN),
            ]
            .iter()
            .filter(|(idx, _)| idx.is_none())
            .map(|(_, name)| format!("'{name}'"))
            .collect();
            return Err(GasbookError::Schema {
                missing: missing.join(", "),
            });
        }
    };

    let mut report = LoadReport::default();
    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!(error = %e, "skipping malformed upload row");
                report.dropped += 1;
                continue;
            }
        };
        match forecast_from_parts(record.get(date_idx), record.get(value_idx)) {
            Some(rec) => report.records.push(rec),
            None => report.dropped += 1,
        }
    }
    Ok(report)
}

pub fn read_forecast_upload_file(path: &Path) -> Result<LoadReport<ForecastRecord>, GasbookError> {
    read_forecast_upload(fs::File::open(path)?)
}

/// Write forecasts in the persisted layout with year/month/day recomputed.
pub fn write_forecasts<W: Write>(writer: W, records: &[ForecastRecord]) -> Result<(), GasbookError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for rec in records {
        wtr.serialize(ForecastOutRow {
            date: rec.date,
            year: rec.year(),
            month: rec.month(),
            day: rec.day(),
            forecast_consumption: rec.forecast_consumption,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_deals<W: Write>(writer: W, records: &[DealRecord]) -> Result<(), GasbookError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for rec in records {
        wtr.serialize(DealOutRow {
            start_date: rec.start_date,
            end_date: rec.end_date,
            deal_type: rec.deal_type.as_str(),
            volume_gj_per_day: rec.volume_gj_per_day,
            price: rec.price,
            supplier: &rec.supplier,
            delivery_point: &rec.delivery_point,
            date: rec.date,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

fn open_if_exists(path: &Path) -> Result<Option<fs::File>, GasbookError> {
    match fs::File::open(path) {
        Ok(f) => Ok(Some(f)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl RecordPort for CsvAdapter {
    fn load_forecasts(&self) -> Result<LoadReport<ForecastRecord>, GasbookError> {
        match open_if_exists(&self.forecast_path())? {
            Some(file) => read_forecasts(file),
            None => Ok(LoadReport::default()),
        }
    }

    fn load_deals(&self) -> Result<LoadReport<DealRecord>, GasbookError> {
        match open_if_exists(&self.deals_path())? {
            Some(file) => read_deals(file),
            None => Ok(LoadReport::default()),
        }
    }

    fn save_forecasts(&self, records: &[ForecastRecord]) -> Result<(), GasbookError> {
        self.write_atomically(&self.forecast_path(), |f| write_forecasts(f, records))
    }

    fn save_deals(&self, records: &[DealRecord]) -> Result<(), GasbookError> {
        self.write_atomically(&self.deals_path(), |f| write_deals(f, records))
    }
}
