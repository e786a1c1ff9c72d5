//! Configuration loading and management.
//!
//! This module provides functionality to load a school's attendance
//! configuration from YAML files: institution timing, named shifts,
//! holidays and the location of persisted salary rules.
//!
//! # Example
//!
//! ```no_run
//! use attendance_payroll::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/riverside").unwrap();
//! println!("Loaded school: {}", config.name());
//! ```

mod loader;
mod types;

use crate::error::EngineResult;

pub use loader::ConfigLoader;
pub use types::{
    HolidaysConfig, InstitutionConfig, InstitutionTiming, ShiftCatalog, ShiftsConfig,
    default_weekly_off,
};

/// A source of the live institution timing.
///
/// Implementations must return the current value on every call rather than a
/// value captured at construction, so a timing change is observed by the next
/// classification.
pub trait TimingSource {
    /// Returns the institution timing as it is right now.
    fn current_timing(&self) -> EngineResult<InstitutionTiming>;
}

impl TimingSource for InstitutionTiming {
    fn current_timing(&self) -> EngineResult<InstitutionTiming> {
        Ok(self.clone())
    }
}

impl TimingSource for std::cell::RefCell<InstitutionTiming> {
    fn current_timing(&self) -> EngineResult<InstitutionTiming> {
        Ok(self.borrow().clone())
    }
}
