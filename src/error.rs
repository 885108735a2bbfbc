//! Error types for boundary validation.
//!
//! The calculator itself never fails; these errors come from parsing and
//! validating caller input before it reaches the computation.

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A date string that is not `YYYY-MM-DD`
    #[error("{field} must be in YYYY-MM-DD format, got '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("start cannot be after end ({start} > {end})")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange { name: &'static str, min: f64, max: f64, value: f64 },

    #[error("country code must be two ASCII letters, got '{0}'")]
    InvalidCountry(String),

    #[error("unknown time zone '{0}'")]
    InvalidTimezone(String),

    #[error("UTC offset of {0} hours cannot be represented as a fixed zone")]
    UnrepresentableOffset(f64),
}

impl Error {
    /// Client-error status an HTTP front end should answer with.
    ///
    /// A malformed prayer-time date is a plain bad request; everything else
    /// is a validation failure on well-formed input.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidDate { field: "date", .. } => 400,
            _ => 422,
        }
    }
}
