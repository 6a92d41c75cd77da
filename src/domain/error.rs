//! Domain error types.

/// Top-level error type for gasbook.
#[derive(Debug, thiserror::Error)]
pub enum GasbookError {
    #[error("invalid deal entry: {reason}")]
    Validation { reason: String },

    #[error("uploaded file must contain {missing} column(s)")]
    Schema { missing: String },

    #[error("row {row}: {reason}")]
    Parse { row: usize, reason: String },

    #[error("failed to persist {path}: {reason}")]
    Persistence { path: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no deal found for {supplier} ({start_date} to {end_date})")]
    DealNotFound {
        supplier: String,
        start_date: String,
        end_date: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GasbookError {
    pub fn validation(reason: impl Into<String>) -> Self {
        GasbookError::Validation {
            reason: reason.into(),
        }
    }
}

impl From<&GasbookError> for std::process::ExitCode {
    fn from(err: &GasbookError) -> Self {
        let code: u8 = match err {
            GasbookError::Io(_) | GasbookError::Csv(_) | GasbookError::Persistence { .. } => 1,
            GasbookError::ConfigParse { .. } | GasbookError::ConfigInvalid { .. } => 2,
            GasbookError::Validation { .. } | GasbookError::Parse { .. } => 3,
            GasbookError::Schema { .. } => 4,
            GasbookError::DealNotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
