//! Attendance classification against shift windows.
//!
//! This module provides the [`ShiftClock`], which turns a raw check-in (and
//! optional check-out) into an attendance status with late and early minutes.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{ShiftCatalog, TimingSource};
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceStatus, GENERAL_SHIFT, ShiftWindow};

use super::CalendarService;
use super::time_math::{early_departure_minutes, late_minutes};

/// The outcome of classifying one check time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceResult {
    /// The classified status.
    pub status: AttendanceStatus,
    /// Minutes after the shift start; zero when on time.
    pub late_minutes: u32,
    /// Minutes before the shift end; zero without a check-out.
    pub early_minutes: u32,
    /// True when either minute count is nonzero.
    pub requires_regularization: bool,
    /// The shift type the times were measured against.
    pub shift_type: String,
    /// Start of the shift window used.
    pub shift_start: NaiveTime,
    /// End of the shift window used.
    pub shift_end: NaiveTime,
}

/// Reads the timing source and derives the `general` window from it.
///
/// A timing that cannot form a window is reported as
/// [`EngineError::ShiftNotConfigured`].
pub(crate) fn live_general_shift(timing: &dyn TimingSource) -> EngineResult<ShiftWindow> {
    let timing = timing.current_timing()?;
    timing.general_shift().map_err(|e| {
        warn!(error = %e, "Institution timing does not form a valid general shift");
        EngineError::ShiftNotConfigured {
            shift_type: GENERAL_SHIFT.to_string(),
        }
    })
}

/// Classifies check times against shift windows.
///
/// The clock holds no timing of its own: the `general` window is derived from
/// the [`TimingSource`] on every resolution, so a change to the institution
/// timing is seen by the next call.
///
/// # Example
///
/// ```
/// use attendance_payroll::calculation::{CalendarService, ShiftClock};
/// use attendance_payroll::config::{InstitutionTiming, ShiftCatalog};
/// use attendance_payroll::models::AttendanceStatus;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let timing = InstitutionTiming::default();
/// let shifts = ShiftCatalog::default();
/// let calendar = CalendarService::default();
/// let clock = ShiftClock::new(&timing, &shifts, &calendar);
///
/// let result = clock
///     .classify_shift_type(
///         None,
///         NaiveTime::from_hms_opt(9, 46, 0).unwrap(),
///         None,
///         NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
///         None,
///     )
///     .unwrap();
/// assert_eq!(result.status, AttendanceStatus::Late);
/// assert_eq!(result.late_minutes, 1);
/// ```
pub struct ShiftClock<'a> {
    timing: &'a dyn TimingSource,
    shifts: &'a ShiftCatalog,
    calendar: &'a CalendarService,
}

impl<'a> ShiftClock<'a> {
    /// Creates a clock over the given timing source, named shifts and calendar.
    pub fn new(
        timing: &'a dyn TimingSource,
        shifts: &'a ShiftCatalog,
        calendar: &'a CalendarService,
    ) -> Self {
        Self {
            timing,
            shifts,
            calendar,
        }
    }

    /// The calendar used for holiday overrides.
    pub fn calendar(&self) -> &CalendarService {
        self.calendar
    }

    /// Derives the `general` window from the live institution timing.
    pub fn general_shift(&self) -> EngineResult<ShiftWindow> {
        live_general_shift(self.timing)
    }

    /// Resolves a shift window by name.
    ///
    /// Unknown names fall back to the `general` shift. `None` and `"general"`
    /// always resolve to the live institution timing.
    pub fn resolve_shift(&self, shift_type: Option<&str>) -> EngineResult<ShiftWindow> {
        match shift_type {
            Some(name) if name != GENERAL_SHIFT => match self.shifts.get(name) {
                Some(window) => Ok(window.clone()),
                None => {
                    warn!(shift_type = name, "Shift not configured, falling back to general");
                    self.general_shift()
                }
            },
            _ => self.general_shift(),
        }
    }

    /// Classifies a check-in (and optional check-out) against `shift`.
    ///
    /// A holiday on `date` for `department` short-circuits to
    /// [`AttendanceStatus::Holiday`] before any time arithmetic. Otherwise
    /// timing is strict: any arrival after the start is late, and late takes
    /// precedence over leaving early while both minute counts are kept.
    pub fn classify(
        &self,
        shift: &ShiftWindow,
        check_in: NaiveTime,
        check_out: Option<NaiveTime>,
        date: NaiveDate,
        department: Option<&str>,
    ) -> AttendanceResult {
        if self.calendar.is_holiday(date, department) {
            debug!(%date, "Holiday override");
            return AttendanceResult {
                status: AttendanceStatus::Holiday,
                late_minutes: 0,
                early_minutes: 0,
                requires_regularization: false,
                shift_type: shift.shift_type.clone(),
                shift_start: shift.start,
                shift_end: shift.end,
            };
        }

        let late = late_minutes(shift, check_in);
        let early = check_out
            .map(|out| early_departure_minutes(shift, check_in, out))
            .unwrap_or(0);

        let status = if late > 0 {
            AttendanceStatus::Late
        } else if early > 0 {
            AttendanceStatus::LeftSoon
        } else {
            AttendanceStatus::Present
        };

        debug!(
            %date,
            shift_type = %shift.shift_type,
            %status,
            late_minutes = late,
            early_minutes = early,
            "Classified attendance"
        );

        AttendanceResult {
            status,
            late_minutes: late,
            early_minutes: early,
            requires_regularization: late > 0 || early > 0,
            shift_type: shift.shift_type.clone(),
            shift_start: shift.start,
            shift_end: shift.end,
        }
    }

    /// Resolves `shift_type` and classifies against it.
    pub fn classify_shift_type(
        &self,
        shift_type: Option<&str>,
        check_in: NaiveTime,
        check_out: Option<NaiveTime>,
        date: NaiveDate,
        department: Option<&str>,
    ) -> EngineResult<AttendanceResult> {
        let shift = self.resolve_shift(shift_type)?;
        Ok(self.classify(&shift, check_in, check_out, date, department))
    }
}
