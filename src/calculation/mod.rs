//! Attendance classification and salary computation.
//!
//! This module contains the calendar of business days and holidays, the
//! shift clock that classifies punches, punch recording, leave pay policy,
//! and the monthly salary computation in its day-based and hours-based modes.

mod calendar;
mod leave_policy;
mod punch;
mod records;
mod salary;
mod salary_enhanced;
mod shift_clock;
pub mod time_math;

pub use calendar::CalendarService;
pub use leave_policy::{LeaveImpact, LeavePolicy, leave_dates};
pub use punch::{PunchEvent, PunchKind};
pub use records::{InMemoryPayrollRecords, PayrollRecords};
pub use salary::{
    DAY_BASED_HOURS_PER_DAY, MonthlyInputs, SalaryComputer, WARN_DATA_INCONSISTENCY,
    WARN_DUPLICATE_RECORD, WARN_INCOMPLETE_PUNCH, WARN_RECORD_IGNORED,
};
pub use salary_enhanced::extra_hours_bonus;
pub use shift_clock::{AttendanceResult, ShiftClock};
