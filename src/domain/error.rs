//! Domain error types.

/// Top-level error type for vtrade.
#[derive(Debug, thiserror::Error)]
pub enum VtradeError {
    #[error("invalid series: {reason}")]
    Validation { reason: String },

    #[error("insufficient history: have {bars} bars, need more than {minimum}")]
    InsufficientHistory { bars: usize, minimum: usize },

    #[error("series shape mismatch: {left} bars vs {right} bars")]
    ShapeMismatch { left: usize, right: usize },

    #[error("series is empty")]
    EmptySeries,

    #[error("cannot resample {source_minutes}m bars into {target_minutes}m bars")]
    InvalidInterval {
        target_minutes: u32,
        source_minutes: u32,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VtradeError {
    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        VtradeError::Validation {
            reason: reason.into(),
        }
    }

    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        VtradeError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            VtradeError::Io(_) | VtradeError::Csv(_) => 1,
            VtradeError::ConfigParse { .. } | VtradeError::ConfigInvalid { .. } => 2,
            VtradeError::Validation { .. } => 3,
            VtradeError::InsufficientHistory { .. }
            | VtradeError::ShapeMismatch { .. }
            | VtradeError::EmptySeries
            | VtradeError::InvalidInterval { .. } => 4,
        }
    }
}

impl From<&VtradeError> for std::process::ExitCode {
    fn from(err: &VtradeError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
