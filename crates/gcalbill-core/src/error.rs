//! Core error types.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while validating billing period input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A date could not be parsed as `YYYY-MM-DD`.
    #[error("cannot parse date {input:?}: {reason}")]
    InvalidDate { input: String, reason: String },

    /// The end of the period precedes its start.
    #[error("end date {end} precedes start date {start}")]
    InvalidRange { start: String, end: String },

    /// Local midnight does not exist for the date in the configured timezone.
    #[error("local midnight of {date} cannot be resolved in this timezone")]
    UnresolvableLocalTime { date: String },
}

impl CoreError {
    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDate {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
