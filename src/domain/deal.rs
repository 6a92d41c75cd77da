//! Supply deals: headers as entered, daily rows as stored.
//!
//! A deal is entered as a date range with a uniform daily volume and is
//! materialised as one [`DealRecord`] per covered day. There is no deal
//! identifier; rows are re-grouped by [`DealKey`].

use crate::domain::dates::days_inclusive;
use crate::domain::error::GasbookError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

pub const KNOWN_SUPPLIERS: &[&str] = &["Shell", "TD", "Emera", "DirectEnergy", "Other"];
pub const KNOWN_DELIVERY_POINTS: &[&str] = &["AECO", "DAWN", "Parkway"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DealType {
    Fixed,
    Index,
}

impl DealType {
    pub const ALL: [DealType; 2] = [DealType::Fixed, DealType::Index];

    pub fn as_str(self) -> &'static str {
        match self {
            DealType::Fixed => "Fixed",
            DealType::Index => "Index",
        }
    }
}

impl fmt::Display for DealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(DealType::Fixed),
            "index" => Ok(DealType::Index),
            other => Err(format!("unknown deal type '{other}'")),
        }
    }
}

/// A deal as submitted: an inclusive date range at a uniform daily rate.
#[derive(Debug, Clone, PartialEq)]
pub struct DealHeader {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub deal_type: DealType,
    /// GJ/day. Negative values are sales or offsets.
    pub volume_gj_per_day: f64,
    /// $/GJ.
    pub price: f64,
    pub supplier: String,
    pub delivery_point: String,
}

impl DealHeader {
    pub fn key(&self) -> DealKey {
        DealKey {
            start_date: self.start_date,
            end_date: self.end_date,
            supplier: self.supplier.clone(),
        }
    }
}

/// One materialised deal day.
///
/// `start_date`/`end_date` are `None` only for persisted rows whose range
/// columns could not be parsed; such rows still count towards daily volume
/// but belong to no editable group.
#[derive(Debug, Clone, PartialEq)]
pub struct DealRecord {
    pub date: NaiveDate,
    pub deal_type: DealType,
    pub volume_gj_per_day: f64,
    pub price: f64,
    pub supplier: String,
    pub delivery_point: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DealRecord {
    pub fn key(&self) -> Option<DealKey> {
        match (self.start_date, self.end_date) {
            (Some(start_date), Some(end_date)) => Some(DealKey {
                start_date,
                end_date,
                supplier: self.supplier.clone(),
            }),
            _ => None,
        }
    }

    pub fn matches(&self, key: &DealKey) -> bool {
        self.start_date == Some(key.start_date)
            && self.end_date == Some(key.end_date)
            && self.supplier == key.supplier
    }
}

/// Composite key locating a deal's rows.
///
/// Two deals entered with the same range and supplier share a key and are
/// indistinguishable from here on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DealKey {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub supplier: String,
}

impl fmt::Display for DealKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} to {})", self.supplier, self.start_date, self.end_date)
    }
}

/// Volume may be negative (a sale) but must be finite; price must be finite
/// and non-negative.
pub fn validate_terms(volume_gj_per_day: f64, price: f64) -> Result<(), GasbookError> {
    if !volume_gj_per_day.is_finite() {
        return Err(GasbookError::validation(format!(
            "volume must be a number, got {volume_gj_per_day}"
        )));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(GasbookError::validation(format!(
            "price must be a non-negative number, got {price}"
        )));
    }
    Ok(())
}

/// Expand a header into one row per day of `[start_date, end_date]`.
///
/// Every row carries the header's daily volume unchanged; the volume is a
/// rate, not a total to be split across days.
pub fn expand_deal(header: &DealHeader) -> Result<Vec<DealRecord>, GasbookError> {
    if header.end_date < header.start_date {
        return Err(GasbookError::validation(format!(
            "end date {} cannot be before start date {}",
            header.end_date, header.start_date
        )));
    }
    validate_terms(header.volume_gj_per_day, header.price)?;

    Ok(days_inclusive(header.start_date, header.end_date)
        .into_iter()
        .map(|date| DealRecord {
            date,
            deal_type: header.deal_type,
            volume_gj_per_day: header.volume_gj_per_day,
            price: header.price,
            supplier: header.supplier.clone(),
            delivery_point: header.delivery_point.clone(),
            start_date: Some(header.start_date),
            end_date: Some(header.end_date),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn header(start: NaiveDate, end: NaiveDate) -> DealHeader {
        DealHeader {
            start_date: start,
            end_date: end,
            deal_type: DealType::Fixed,
            volume_gj_per_day: 600.0,
            price: 3.25,
            supplier: "Shell".into(),
            delivery_point: "DAWN".into(),
        }
    }

    #[test]
    fn expands_one_row_per_day() {
        let rows = expand_deal(&header(d(2025, 8, 2), d(2025, 8, 8))).unwrap();
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].date, d(2025, 8, 2));
        assert_eq!(rows[6].date, d(2025, 8, 8));
        assert!(rows.iter().all(|r| r.volume_gj_per_day == 600.0));
        assert!(rows.iter().all(|r| r.start_date == Some(d(2025, 8, 2))));
        assert!(rows.iter().all(|r| r.end_date == Some(d(2025, 8, 8))));
    }

    #[test]
    fn single_day_deal() {
        let rows = expand_deal(&header(d(2025, 8, 2), d(2025, 8, 2))).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn crosses_month_boundary() {
        let rows = expand_deal(&header(d(2024, 2, 27), d(2024, 3, 2))).unwrap();
        // 2024 is a leap year: 27, 28, 29 Feb then 1, 2 Mar.
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2].date, d(2024, 2, 29));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = expand_deal(&header(d(2025, 8, 8), d(2025, 8, 2))).unwrap_err();
        assert!(matches!(err, GasbookError::Validation { .. }));
    }

    #[test]
    fn invalid_terms_are_rejected() {
        let mut h = header(d(2025, 8, 2), d(2025, 8, 3));
        h.price = -0.5;
        assert!(matches!(expand_deal(&h), Err(GasbookError::Validation { .. })));

        let mut h = header(d(2025, 8, 2), d(2025, 8, 3));
        h.volume_gj_per_day = f64::NAN;
        assert!(matches!(expand_deal(&h), Err(GasbookError::Validation { .. })));

        assert!(validate_terms(-150.0, 0.0).is_ok());
        assert!(validate_terms(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn negative_volume_is_kept() {
        let mut h = header(d(2025, 8, 2), d(2025, 8, 3));
        h.volume_gj_per_day = -150.0;
        let rows = expand_deal(&h).unwrap();
        assert!(rows.iter().all(|r| r.volume_gj_per_day == -150.0));
    }

    #[test]
    fn record_key_requires_both_range_dates() {
        let mut row = expand_deal(&header(d(2025, 8, 2), d(2025, 8, 2))).unwrap().remove(0);
        let key = row.key().unwrap();
        assert!(row.matches(&key));
        assert_eq!(key.to_string(), "Shell (2025-08-02 to 2025-08-02)");

        row.end_date = None;
        assert!(row.key().is_none());
        assert!(!row.matches(&key));
    }

    #[test]
    fn deal_type_parses_case_insensitively() {
        assert_eq!("fixed".parse::<DealType>(), Ok(DealType::Fixed));
        assert_eq!(" Index ".parse::<DealType>(), Ok(DealType::Index));
        assert!("swing".parse::<DealType>().is_err());
    }

    proptest! {
        #[test]
        fn expansion_row_count_matches_span(start_offset in 0i64..2000, span in 0i64..400) {
            let start = d(2020, 1, 1) + chrono::Duration::days(start_offset);
            let end = start + chrono::Duration::days(span);
            let h = header(start, end);
            let rows = expand_deal(&h).unwrap();
            prop_assert_eq!(rows.len() as i64, span + 1);
            for r in &rows {
                prop_assert_eq!(r.deal_type, h.deal_type);
                prop_assert_eq!(r.volume_gj_per_day, h.volume_gj_per_day);
                prop_assert_eq!(r.price, h.price);
                prop_assert_eq!(&r.supplier, &h.supplier);
                prop_assert_eq!(&r.delivery_point, &h.delivery_point);
            }
        }

        #[test]
        fn inverted_range_yields_no_rows(start_offset in 0i64..2000, gap in 1i64..400) {
            let end = d(2020, 1, 1) + chrono::Duration::days(start_offset);
            let start = end + chrono::Duration::days(gap);
            prop_assert!(expand_deal(&header(start, end)).is_err());
        }
    }
}
