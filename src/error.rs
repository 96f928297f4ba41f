//! Error types shared by the simulator

use thiserror::Error;

/// Errors raised while validating inputs or running the simulation pipeline
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// Rejected input, raised eagerly at construction time
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// An operation ran before the schedule it depends on was built
    #[error("prerequisite missing: {0}")]
    Prerequisite(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimulatorError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SimulatorError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn prerequisite(what: impl Into<String>) -> Self {
        SimulatorError::Prerequisite(what.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SimulatorError::Validation { .. })
    }

    pub fn is_prerequisite(&self) -> bool {
        matches!(self, SimulatorError::Prerequisite(_))
    }
}

pub type Result<T> = std::result::Result<T, SimulatorError>;

/// Reject NaN and infinities before any range check
pub(crate) fn ensure_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulatorError::validation(field, format!("must be a finite number, got {}", value)))
    }
}
