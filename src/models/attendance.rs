//! Attendance day model and status types.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::ShiftWindow;

/// The classified status of a staff member's day.
///
/// Stored statuses that the engine does not recognise deserialize to
/// [`AttendanceStatus::Unrecognized`] and are treated as absences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Arrived on or before shift start and stayed until shift end.
    Present,
    /// Arrived after shift start.
    Late,
    /// Arrived on time but checked out before shift end.
    LeftSoon,
    /// Did not attend.
    Absent,
    /// On approved leave.
    Leave,
    /// On an approved off-site duty assignment.
    OnDuty,
    /// The date is a holiday for the staff member.
    Holiday,
    /// Any stored status the engine does not know.
    #[serde(other)]
    Unrecognized,
}

impl AttendanceStatus {
    /// Returns true for statuses that mean the staff member attended in person.
    pub fn is_attended(&self) -> bool {
        matches!(
            self,
            AttendanceStatus::Present | AttendanceStatus::Late | AttendanceStatus::LeftSoon
        )
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::LeftSoon => "left_soon",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Leave => "leave",
            AttendanceStatus::OnDuty => "on_duty",
            AttendanceStatus::Holiday => "holiday",
            AttendanceStatus::Unrecognized => "unrecognized",
        };
        f.write_str(label)
    }
}

/// Parses a stored clock time in `HH:MM:SS` or `HH:MM` form.
///
/// # Example
///
/// ```
/// use attendance_payroll::models::parse_clock_time;
/// use chrono::NaiveTime;
///
/// assert_eq!(parse_clock_time("09:45"), NaiveTime::from_hms_opt(9, 45, 0));
/// assert_eq!(parse_clock_time("17:39:00"), NaiveTime::from_hms_opt(17, 39, 0));
/// assert_eq!(parse_clock_time("quarter to ten"), None);
/// ```
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// One staff member's attendance for one date.
///
/// Punch times are kept as the raw strings the store holds; they are parsed
/// on demand so a single corrupt value surfaces as
/// [`EngineError::DataInconsistency`] for that record only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceDay {
    /// The staff member.
    pub staff_id: String,
    /// The calendar date of the record.
    pub date: NaiveDate,
    /// Raw check-in time.
    #[serde(default)]
    pub time_in: Option<String>,
    /// Raw check-out time.
    #[serde(default)]
    pub time_out: Option<String>,
    /// Classified status.
    pub status: AttendanceStatus,
    /// Minutes late against the shift start.
    #[serde(default)]
    pub late_minutes: u32,
    /// Minutes left before the shift end.
    #[serde(default)]
    pub early_minutes: u32,
    /// Overtime hours accumulated from overtime punches.
    #[serde(default)]
    pub overtime_hours: Decimal,
    /// Hours worked, when the punch workflow recorded them.
    #[serde(default)]
    pub work_hours: Option<Decimal>,
    /// Raw start of an open overtime session.
    #[serde(default)]
    pub overtime_in: Option<String>,
    /// The shift window the record was classified against.
    #[serde(default)]
    pub shift: Option<ShiftWindow>,
}

impl AttendanceDay {
    /// Creates an empty record with the given status and no punches.
    pub fn with_status(
        staff_id: impl Into<String>,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Self {
        Self {
            staff_id: staff_id.into(),
            date,
            time_in: None,
            time_out: None,
            status,
            late_minutes: 0,
            early_minutes: 0,
            overtime_hours: Decimal::ZERO,
            work_hours: None,
            overtime_in: None,
            shift: None,
        }
    }

    /// Parses the stored check-in time.
    pub fn parsed_time_in(&self) -> EngineResult<Option<NaiveTime>> {
        self.parse_field("time_in", self.time_in.as_deref())
    }

    /// Parses the stored check-out time.
    pub fn parsed_time_out(&self) -> EngineResult<Option<NaiveTime>> {
        self.parse_field("time_out", self.time_out.as_deref())
    }

    /// Parses the stored start of an open overtime session.
    pub fn parsed_overtime_in(&self) -> EngineResult<Option<NaiveTime>> {
        self.parse_field("overtime_in", self.overtime_in.as_deref())
    }

    fn parse_field(&self, field: &str, raw: Option<&str>) -> EngineResult<Option<NaiveTime>> {
        match raw {
            None => Ok(None),
            Some(value) => {
                parse_clock_time(value)
                    .map(Some)
                    .ok_or_else(|| EngineError::DataInconsistency {
                        staff_id: self.staff_id.clone(),
                        date: self.date,
                        field: field.to_string(),
                        value: value.to_string(),
                    })
            }
        }
    }

    /// Returns true if the record carries minutes awaiting regularization.
    pub fn requires_regularization(&self) -> bool {
        self.late_minutes > 0 || self.early_minutes > 0
    }

    /// Applies an approved regularization request.
    ///
    /// Late and early minutes are cleared and a `late`/`left_soon` day becomes
    /// `present`. Other statuses are left alone.
    pub fn apply_regularization(&mut self) {
        self.late_minutes = 0;
        self.early_minutes = 0;
        if matches!(
            self.status,
            AttendanceStatus::Late | AttendanceStatus::LeftSoon
        ) {
            self.status = AttendanceStatus::Present;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn late_day() -> AttendanceDay {
        let mut day = AttendanceDay::with_status("T-001", date(2024, 3, 4), AttendanceStatus::Late);
        day.time_in = Some("10:00:00".to_string());
        day.late_minutes = 15;
        day.early_minutes = 5;
        day
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::LeftSoon).unwrap(),
            "\"left_soon\""
        );
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::OnDuty).unwrap(),
            "\"on_duty\""
        );
    }

    #[test]
    fn test_unknown_status_falls_back() {
        let status: AttendanceStatus = serde_json::from_str("\"half_day\"").unwrap();
        assert_eq!(status, AttendanceStatus::Unrecognized);
        assert!(!status.is_attended());
    }

    #[test]
    fn test_attended_statuses() {
        assert!(AttendanceStatus::Present.is_attended());
        assert!(AttendanceStatus::Late.is_attended());
        assert!(AttendanceStatus::LeftSoon.is_attended());
        assert!(!AttendanceStatus::OnDuty.is_attended());
        assert!(!AttendanceStatus::Holiday.is_attended());
    }

    #[test]
    fn test_parsed_time_in_accepts_short_form() {
        let mut day = late_day();
        day.time_in = Some("09:46".to_string());
        assert_eq!(
            day.parsed_time_in().unwrap(),
            NaiveTime::from_hms_opt(9, 46, 0)
        );
    }

    #[test]
    fn test_parsed_time_out_missing_is_none() {
        assert_eq!(late_day().parsed_time_out().unwrap(), None);
    }

    #[test]
    fn test_unparsable_time_reports_inconsistency() {
        let mut day = late_day();
        day.time_out = Some("4.30pm".to_string());
        match day.parsed_time_out() {
            Err(EngineError::DataInconsistency { field, value, .. }) => {
                assert_eq!(field, "time_out");
                assert_eq!(value, "4.30pm");
            }
            other => panic!("Expected DataInconsistency, got {:?}", other),
        }
    }

    #[test]
    fn test_regularization_clears_minutes_and_status() {
        let mut day = late_day();
        assert!(day.requires_regularization());

        day.apply_regularization();

        assert_eq!(day.status, AttendanceStatus::Present);
        assert_eq!(day.late_minutes, 0);
        assert_eq!(day.early_minutes, 0);
        assert!(!day.requires_regularization());
    }

    #[test]
    fn test_regularization_keeps_absent() {
        let mut day = AttendanceDay::with_status("T-001", date(2024, 3, 5), AttendanceStatus::Absent);
        day.apply_regularization();
        assert_eq!(day.status, AttendanceStatus::Absent);
    }

    #[test]
    fn test_attendance_day_deserialization_defaults() {
        let json = r#"{
            "staff_id": "T-009",
            "date": "2024-03-06",
            "time_in": "09:40:00",
            "time_out": "16:45:00",
            "status": "present",
            "work_hours": "7.08"
        }"#;

        let day: AttendanceDay = serde_json::from_str(json).unwrap();
        assert_eq!(day.late_minutes, 0);
        assert_eq!(day.overtime_hours, Decimal::ZERO);
        assert_eq!(day.work_hours, Some(Decimal::from_str("7.08").unwrap()));
        assert!(day.shift.is_none());
    }
}
