//! Core data models for the attendance and payroll engine.
//!
//! This module contains the typed records exchanged with the persistence and
//! reporting layers around the engine.

mod attendance;
mod date_range;
mod holiday;
mod leave;
mod salary_breakdown;
mod shift;
mod staff;

pub use attendance::{AttendanceDay, AttendanceStatus, parse_clock_time};
pub use date_range::DateRange;
pub use holiday::{Holiday, HolidayScope, SchoolId};
pub use leave::{LeaveGrant, LeaveStatus, LeaveType};
pub use salary_breakdown::{
    AuditStep, AuditTrace, AuditWarning, ComputationMode, DayCounts, Deductions, Earnings,
    HoursSummary, SalaryBreakdown,
};
pub use shift::{GENERAL_SHIFT, ShiftWindow};
pub use staff::StaffPayProfile;
