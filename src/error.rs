//! Error types for the attendance and payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during classification, rule
//! resolution and salary computation.

use chrono::NaiveDate;
use thiserror::Error;

/// Broad category of an [`EngineError`].
///
/// Report and API layers use this to pick a user-facing message without
/// matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The institution or staff configuration cannot support the request.
    Configuration,
    /// A referenced record does not exist.
    NotFound,
    /// A stored record holds a value that cannot be interpreted.
    DataInconsistency,
    /// Caller-supplied input was rejected.
    Validation,
    /// Reading or writing persisted state failed.
    Storage,
}

/// The main error type for the engine.
///
/// All public operations return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use attendance_payroll::error::{EngineError, ErrorKind};
///
/// let error = EngineError::ShiftNotConfigured {
///     shift_type: "general".to_string(),
/// };
/// assert_eq!(error.to_string(), "Shift not configured: general");
/// assert_eq!(error.kind(), ErrorKind::Configuration);
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Neither the requested shift nor the `general` fallback could be resolved.
    #[error("Shift not configured: {shift_type}")]
    ShiftNotConfigured {
        /// The shift type that was requested.
        shift_type: String,
    },

    /// A shift window was invalid.
    #[error("Invalid shift window '{shift_type}': {message}")]
    InvalidShiftWindow {
        /// The shift type of the invalid window.
        shift_type: String,
        /// A description of what made the window invalid.
        message: String,
    },

    /// The hours-based mode needs a positive basic salary.
    #[error("Base salary not configured for staff '{staff_id}'")]
    BaseSalaryNotConfigured {
        /// The staff member with no usable basic salary.
        staff_id: String,
    },

    /// The month has no business days to pro-rate against.
    #[error("No business days in {year}-{month:02}")]
    NoBusinessDays {
        /// The year of the month.
        year: i32,
        /// The month number (1-12).
        month: u32,
    },

    /// The requested year/month is not a valid calendar month.
    #[error("Invalid pay period {year}-{month}")]
    InvalidPeriod {
        /// The requested year.
        year: i32,
        /// The requested month.
        month: u32,
    },

    /// The staff member has no pay profile.
    #[error("Staff not found: {staff_id}")]
    StaffNotFound {
        /// The unknown staff id.
        staff_id: String,
    },

    /// A stored attendance field could not be interpreted.
    #[error("Inconsistent {field} '{value}' on attendance of '{staff_id}' for {date}")]
    DataInconsistency {
        /// The staff member owning the record.
        staff_id: String,
        /// The date of the record.
        date: NaiveDate,
        /// The field holding the bad value.
        field: String,
        /// The raw stored value.
        value: String,
    },

    /// A punch could not be applied to the day's record.
    #[error("Invalid punch for '{staff_id}' on {date}: {message}")]
    InvalidPunch {
        /// The staff member punching.
        staff_id: String,
        /// The date of the punch.
        date: NaiveDate,
        /// Why the punch was rejected.
        message: String,
    },

    /// A rule name is not one the engine knows.
    #[error("Unknown salary rule: {name}")]
    UnknownRule {
        /// The unrecognised rule name.
        name: String,
    },

    /// A rule value was rejected.
    #[error("Invalid value for salary rule '{name}': {message}")]
    InvalidRuleValue {
        /// The rule being updated.
        name: String,
        /// Why the value was rejected.
        message: String,
    },

    /// Persisted state could not be read or written.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },
}

impl EngineError {
    /// Returns the broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::ShiftNotConfigured { .. }
            | EngineError::InvalidShiftWindow { .. }
            | EngineError::BaseSalaryNotConfigured { .. }
            | EngineError::NoBusinessDays { .. } => ErrorKind::Configuration,
            EngineError::StaffNotFound { .. } => ErrorKind::NotFound,
            EngineError::DataInconsistency { .. } => ErrorKind::DataInconsistency,
            EngineError::InvalidPeriod { .. }
            | EngineError::InvalidPunch { .. }
            | EngineError::UnknownRule { .. }
            | EngineError::InvalidRuleValue { .. } => ErrorKind::Validation,
            EngineError::Storage { .. } => ErrorKind::Storage,
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
