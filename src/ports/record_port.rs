//! Record persistence port.

use crate::domain::deal::DealRecord;
use crate::domain::error::GasbookError;
use crate::domain::forecast::ForecastRecord;
use crate::domain::store::LoadReport;

/// Load and save contract for the two record collections.
///
/// Loads tolerate bad rows: anything unusable is dropped and counted in the
/// returned [`LoadReport`]. A missing collection loads as empty. Saves
/// replace the whole collection.
pub trait RecordPort {
    fn load_forecasts(&self) -> Result<LoadReport<ForecastRecord>, GasbookError>;

    fn load_deals(&self) -> Result<LoadReport<DealRecord>, GasbookError>;

    fn save_forecasts(&self, records: &[ForecastRecord]) -> Result<(), GasbookError>;

    fn save_deals(&self, records: &[DealRecord]) -> Result<(), GasbookError>;
}
