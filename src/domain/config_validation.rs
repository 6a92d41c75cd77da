//! Configuration validation.
//!
//! Checks every recognised key up-front so a bad file fails before any
//! records are loaded.

use crate::domain::error::GasbookError;
use crate::domain::units::VolumeUnit;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), GasbookError> {
    validate_data_dir(config)?;
    validate_flag(config, "persistence", "enabled")?;
    validate_flag(config, "weekly", "preview_next_week")?;
    validate_unit(config)?;
    Ok(())
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), GasbookError> {
    match config.get_string("data", "dir") {
        Some(s) if s.trim().is_empty() => Err(GasbookError::ConfigInvalid {
            section: "data".to_string(),
            key: "dir".to_string(),
            reason: "dir must not be empty".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_flag(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), GasbookError> {
    match config.get_bool(section, key) {
        Some(Err(value)) => Err(GasbookError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("expected true/false, got '{value}'"),
        }),
        _ => Ok(()),
    }
}

fn validate_unit(config: &dyn ConfigPort) -> Result<(), GasbookError> {
    match config.get_string("report", "unit") {
        Some(s) => s
            .parse::<VolumeUnit>()
            .map(|_| ())
            .map_err(|reason| GasbookError::ConfigInvalid {
                section: "report".to_string(),
                key: "unit".to_string(),
                reason,
            }),
        None => Ok(()),
    }
}
