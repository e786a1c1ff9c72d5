//! Read access to the stored records a salary computation needs.
//!
//! The engine owns no storage. Hosts implement [`PayrollRecords`] over their
//! database; [`InMemoryPayrollRecords`] serves tests and small embeddings.

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceDay, DateRange, LeaveGrant, StaffPayProfile};

/// Source of pay profiles, attendance and leave for salary computation.
pub trait PayrollRecords {
    /// The pay profile of a staff member.
    ///
    /// Returns [`EngineError::StaffNotFound`] for an unknown id.
    fn pay_profile(&self, staff_id: &str) -> EngineResult<StaffPayProfile>;

    /// The staff member's attendance rows for a month, ordered by date.
    fn attendance(&self, staff_id: &str, year: i32, month: u32)
    -> EngineResult<Vec<AttendanceDay>>;

    /// Leave grants of any status overlapping `range`.
    fn leave_grants(&self, staff_id: &str, range: &DateRange) -> EngineResult<Vec<LeaveGrant>>;
}

/// Records held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPayrollRecords {
    profiles: HashMap<String, StaffPayProfile>,
    attendance: Vec<AttendanceDay>,
    leave: Vec<LeaveGrant>,
}

impl InMemoryPayrollRecords {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a pay profile.
    pub fn add_profile(&mut self, profile: StaffPayProfile) {
        self.profiles.insert(profile.staff_id.clone(), profile);
    }

    /// Adds an attendance row. Rows are stored as given, duplicates included.
    pub fn add_attendance(&mut self, day: AttendanceDay) {
        self.attendance.push(day);
    }

    /// Stores a row, replacing any row for the same staff member and date.
    pub fn upsert_attendance(&mut self, day: AttendanceDay) {
        match self
            .attendance
            .iter_mut()
            .find(|d| d.staff_id == day.staff_id && d.date == day.date)
        {
            Some(slot) => *slot = day,
            None => self.attendance.push(day),
        }
    }

    /// The stored row for a staff member and date, if any.
    pub fn attendance_on(&self, staff_id: &str, date: chrono::NaiveDate) -> Option<&AttendanceDay> {
        self.attendance
            .iter()
            .find(|d| d.staff_id == staff_id && d.date == date)
    }

    /// Adds a leave grant.
    pub fn add_leave(&mut self, grant: LeaveGrant) {
        self.leave.push(grant);
    }
}

impl PayrollRecords for InMemoryPayrollRecords {
    fn pay_profile(&self, staff_id: &str) -> EngineResult<StaffPayProfile> {
        self.profiles
            .get(staff_id)
            .cloned()
            .ok_or_else(|| EngineError::StaffNotFound {
                staff_id: staff_id.to_string(),
            })
    }

    fn attendance(
        &self,
        staff_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<AttendanceDay>> {
        let period =
            DateRange::month(year, month).ok_or(EngineError::InvalidPeriod { year, month })?;
        let mut rows: Vec<AttendanceDay> = self
            .attendance
            .iter()
            .filter(|d| d.staff_id == staff_id && period.contains(d.date))
            .cloned()
            .collect();
        // stable, so duplicates keep insertion order
        rows.sort_by_key(|d| d.date);
        Ok(rows)
    }

    fn leave_grants(&self, staff_id: &str, range: &DateRange) -> EngineResult<Vec<LeaveGrant>> {
        Ok(self
            .leave
            .iter()
            .filter(|g| g.staff_id == staff_id && g.dates.clip(range).is_some())
            .cloned()
            .collect())
    }
}
