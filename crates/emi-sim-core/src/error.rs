use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanEngineError {
    #[error("Invalid argument: {field} — {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Validation failed: {field} — {reason}")]
    Validation { field: String, reason: String },

    #[error("Date overflow: {0}")]
    DateOverflow(String),

    #[error("Loan not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LoanEngineError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanEngineError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        LoanEngineError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LoanEngineError {
    fn from(e: serde_json::Error) -> Self {
        LoanEngineError::Serialization(e.to_string())
    }
}
