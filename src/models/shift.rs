//! Shift window model.
//!
//! A shift window is the configured start/end time-of-day staff are expected
//! to work. Windows whose end is earlier than their start wrap past midnight.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Name of the shift that is always derived from the institution timing.
pub const GENERAL_SHIFT: &str = "general";

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// A named work-shift window.
///
/// # Examples
///
/// ```
/// use attendance_payroll::models::ShiftWindow;
/// use chrono::NaiveTime;
/// use rust_decimal::Decimal;
///
/// let night = ShiftWindow::new(
///     "night",
///     NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
/// )
/// .unwrap();
/// assert!(night.wraps_midnight());
/// assert_eq!(night.duration_hours(), Decimal::from(8));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    /// The shift type name (e.g. "general", "morning").
    pub shift_type: String,
    /// Expected start time.
    pub start: NaiveTime,
    /// Expected end time. Earlier than `start` for overnight shifts.
    pub end: NaiveTime,
}

impl ShiftWindow {
    /// Creates a validated shift window.
    ///
    /// Returns [`EngineError::InvalidShiftWindow`] when `start == end`.
    pub fn new(
        shift_type: impl Into<String>,
        start: NaiveTime,
        end: NaiveTime,
    ) -> EngineResult<Self> {
        let window = Self {
            shift_type: shift_type.into(),
            start,
            end,
        };
        window.validate()?;
        Ok(window)
    }

    /// Checks the `start != end` invariant.
    ///
    /// Windows deserialized from configuration bypass [`ShiftWindow::new`],
    /// so loaders call this explicitly.
    pub fn validate(&self) -> EngineResult<()> {
        if self.start == self.end {
            return Err(EngineError::InvalidShiftWindow {
                shift_type: self.shift_type.clone(),
                message: "start and end times are equal".to_string(),
            });
        }
        Ok(())
    }

    /// Returns true if the window ends on the following day.
    pub fn wraps_midnight(&self) -> bool {
        self.end < self.start
    }

    /// Length of the window in seconds, adding a day for overnight windows.
    ///
    /// Zero only for a window that bypassed validation with `start == end`.
    pub fn duration_seconds(&self) -> i64 {
        let raw = (self.end - self.start).num_seconds();
        if self.wraps_midnight() {
            raw + SECONDS_PER_DAY
        } else {
            raw
        }
    }

    /// Length of the window in hours, keeping any seconds.
    pub fn duration_hours(&self) -> Decimal {
        Decimal::from(self.duration_seconds()) / Decimal::from(3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// SW-001: day shift duration
    #[test]
    fn test_day_shift_duration() {
        let window = ShiftWindow::new("general", time(9, 45), time(16, 30)).unwrap();
        assert!(!window.wraps_midnight());
        assert_eq!(window.duration_seconds(), 405 * 60);
        assert_eq!(window.duration_hours(), Decimal::from_str("6.75").unwrap());
    }

    /// SW-002: overnight shift adds 24 hours
    #[test]
    fn test_overnight_shift_duration() {
        let window = ShiftWindow::new("night", time(22, 0), time(6, 0)).unwrap();
        assert!(window.wraps_midnight());
        assert_eq!(window.duration_seconds(), 480 * 60);
    }

    /// SW-003: zero-length window rejected
    #[test]
    fn test_equal_start_end_rejected() {
        let result = ShiftWindow::new("broken", time(9, 0), time(9, 0));
        match result {
            Err(EngineError::InvalidShiftWindow { shift_type, .. }) => {
                assert_eq!(shift_type, "broken");
            }
            other => panic!("Expected InvalidShiftWindow, got {:?}", other),
        }
    }

    /// SW-004: seconds are kept in the duration
    #[test]
    fn test_sub_minute_window_duration() {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(9, 0, 30).unwrap();
        let window = ShiftWindow::new("general", start, end).unwrap();
        assert_eq!(window.duration_seconds(), 30);
        assert!(window.duration_hours() > Decimal::ZERO);

        let with_seconds = ShiftWindow::new(
            "general",
            time(9, 0),
            NaiveTime::from_hms_opt(17, 0, 45).unwrap(),
        )
        .unwrap();
        assert_eq!(with_seconds.duration_hours(), Decimal::from_str("8.0125").unwrap());
    }

    #[test]
    fn test_shift_window_deserialization() {
        let yaml = "shift_type: morning\nstart: \"07:30:00\"\nend: \"13:00:00\"\n";
        let window: ShiftWindow = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(window.start, time(7, 30));
        assert!(window.validate().is_ok());
    }
}
