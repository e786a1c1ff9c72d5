//! Punch recording.
//!
//! A day's [`AttendanceDay`] is created by the first check-in and updated by
//! later punches. The record keeps the shift window it was classified
//! against so later punches and payroll use the same window.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::AttendanceDay;

use super::ShiftClock;
use super::time_math::{round_hours, span_hours};

const CLOCK_FORMAT: &str = "%H:%M:%S";

/// The kind of punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunchKind {
    /// Start of the working day.
    CheckIn,
    /// End of the working day.
    CheckOut,
    /// Start of an overtime session.
    OvertimeIn,
    /// End of an overtime session.
    OvertimeOut,
}

/// A raw punch from a terminal or manual entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchEvent {
    /// The staff member punching.
    pub staff_id: String,
    /// The attendance date the punch belongs to.
    pub date: NaiveDate,
    /// Clock time of the punch.
    pub time: NaiveTime,
    /// What the punch records.
    pub kind: PunchKind,
    /// The staff member's assigned shift, if any.
    #[serde(default)]
    pub shift_type: Option<String>,
    /// The staff member's department, for department holidays.
    #[serde(default)]
    pub department: Option<String>,
}

impl ShiftClock<'_> {
    /// Applies a punch to the day's record and returns the updated record.
    ///
    /// `existing` is the stored record for the punch's staff member and date,
    /// if there is one. The input record is never modified in place.
    pub fn record_punch(
        &self,
        existing: Option<AttendanceDay>,
        event: &PunchEvent,
    ) -> EngineResult<AttendanceDay> {
        if let Some(day) = &existing {
            if day.staff_id != event.staff_id || day.date != event.date {
                return Err(invalid(
                    event,
                    format!(
                        "record belongs to '{}' on {}",
                        day.staff_id, day.date
                    ),
                ));
            }
        }

        let day = match event.kind {
            PunchKind::CheckIn => self.check_in(existing, event)?,
            PunchKind::CheckOut => self.check_out(require(existing, event)?, event)?,
            PunchKind::OvertimeIn => overtime_in(require(existing, event)?, event)?,
            PunchKind::OvertimeOut => overtime_out(require(existing, event)?, event)?,
        };

        info!(
            staff_id = %event.staff_id,
            date = %event.date,
            kind = ?event.kind,
            status = %day.status,
            "Recorded punch"
        );
        Ok(day)
    }

    fn check_in(
        &self,
        existing: Option<AttendanceDay>,
        event: &PunchEvent,
    ) -> EngineResult<AttendanceDay> {
        if existing.as_ref().is_some_and(|d| d.time_in.is_some()) {
            return Err(invalid(event, "already checked in".to_string()));
        }

        let shift = self.resolve_shift(event.shift_type.as_deref())?;
        let result = self.classify(
            &shift,
            event.time,
            None,
            event.date,
            event.department.as_deref(),
        );

        let mut day = existing.unwrap_or_else(|| {
            AttendanceDay::with_status(event.staff_id.clone(), event.date, result.status)
        });
        day.time_in = Some(event.time.format(CLOCK_FORMAT).to_string());
        day.status = result.status;
        day.late_minutes = result.late_minutes;
        day.early_minutes = 0;
        day.shift = Some(shift);
        Ok(day)
    }

    fn check_out(&self, mut day: AttendanceDay, event: &PunchEvent) -> EngineResult<AttendanceDay> {
        if day.time_out.is_some() {
            return Err(invalid(event, "already checked out".to_string()));
        }
        let Some(check_in) = day.parsed_time_in()? else {
            return Err(invalid(event, "check-out without check-in".to_string()));
        };

        let shift = match day.shift.clone() {
            Some(window) => window,
            None => self.resolve_shift(event.shift_type.as_deref())?,
        };
        let result = self.classify(
            &shift,
            check_in,
            Some(event.time),
            event.date,
            event.department.as_deref(),
        );

        day.time_out = Some(event.time.format(CLOCK_FORMAT).to_string());
        day.status = result.status;
        day.late_minutes = result.late_minutes;
        day.early_minutes = result.early_minutes;
        day.work_hours = Some(round_hours(span_hours(check_in, event.time)));
        day.shift = Some(shift);
        Ok(day)
    }
}

fn overtime_in(mut day: AttendanceDay, event: &PunchEvent) -> EngineResult<AttendanceDay> {
    if day.overtime_in.is_some() {
        return Err(invalid(event, "overtime session already open".to_string()));
    }
    day.overtime_in = Some(event.time.format(CLOCK_FORMAT).to_string());
    Ok(day)
}

fn overtime_out(mut day: AttendanceDay, event: &PunchEvent) -> EngineResult<AttendanceDay> {
    let Some(started) = day.parsed_overtime_in()? else {
        return Err(invalid(event, "no open overtime session".to_string()));
    };
    let hours = round_hours(span_hours(started, event.time));
    debug!(staff_id = %event.staff_id, %hours, "Closing overtime session");
    day.overtime_hours += hours;
    day.overtime_in = None;
    Ok(day)
}

fn require(existing: Option<AttendanceDay>, event: &PunchEvent) -> EngineResult<AttendanceDay> {
    existing.ok_or_else(|| invalid(event, "no attendance record for the day".to_string()))
}

fn invalid(event: &PunchEvent, message: String) -> EngineError {
    EngineError::InvalidPunch {
        staff_id: event.staff_id.clone(),
        date: event.date,
        message,
    }
}
