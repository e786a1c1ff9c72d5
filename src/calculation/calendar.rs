//! Business-day and holiday resolution.
//!
//! This module provides the [`CalendarService`], which knows a school's
//! holidays and weekly off days and answers whether a date is a business day.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::config::default_weekly_off;
use crate::error::{EngineError, EngineResult};
use crate::models::{DateRange, Holiday, SchoolId};

/// Resolves holidays and business days for one school.
///
/// A day is a business day iff it is not a weekly off day and no active
/// institution-wide holiday covers it. Department-specific holidays only
/// affect lookups made with a matching department.
///
/// # Example
///
/// ```
/// use attendance_payroll::calculation::CalendarService;
/// use attendance_payroll::models::{DateRange, Holiday};
/// use chrono::NaiveDate;
///
/// let republic_day = NaiveDate::from_ymd_opt(2024, 1, 26).unwrap();
/// let calendar = CalendarService::for_school(
///     1,
///     vec![Holiday::institution_wide(1, "Republic Day", DateRange::single(republic_day))],
/// );
///
/// assert!(calendar.is_holiday(republic_day, None));
/// assert!(!calendar.is_business_day(republic_day));
/// // January 2024: 27 non-Sundays, one of them a holiday
/// assert_eq!(calendar.business_days_in_month(2024, 1).unwrap(), 26);
/// ```
#[derive(Debug, Clone)]
pub struct CalendarService {
    holidays: Vec<Holiday>,
    weekly_off: Vec<Weekday>,
}

impl Default for CalendarService {
    fn default() -> Self {
        Self {
            holidays: Vec::new(),
            weekly_off: default_weekly_off(),
        }
    }
}

impl CalendarService {
    /// Creates a calendar over the active holidays given, with Sunday off.
    pub fn new(holidays: impl IntoIterator<Item = Holiday>) -> Self {
        Self {
            holidays: holidays.into_iter().filter(|h| h.is_active).collect(),
            ..Self::default()
        }
    }

    /// Creates a calendar for `school_id`, ignoring other schools' and inactive holidays.
    pub fn for_school(school_id: SchoolId, holidays: impl IntoIterator<Item = Holiday>) -> Self {
        Self::new(holidays.into_iter().filter(|h| h.school_id == school_id))
    }

    /// Replaces the weekly off days.
    pub fn with_weekly_off(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.weekly_off = days.into_iter().collect();
        self
    }

    /// Returns true if `date` falls on a weekly off day.
    pub fn is_weekly_off(&self, date: NaiveDate) -> bool {
        self.weekly_off.contains(&date.weekday())
    }

    /// Returns true if any active holiday applicable to `department` covers `date`.
    ///
    /// With no department only institution-wide holidays match. Overlapping
    /// holidays are allowed.
    pub fn is_holiday(&self, date: NaiveDate, department: Option<&str>) -> bool {
        self.holidays.iter().any(|h| h.applies_on(date, department))
    }

    /// Returns true if `date` is neither a weekly off day nor an institution-wide holiday.
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !self.is_weekly_off(date) && !self.is_holiday(date, None)
    }

    /// Counts business days from `start` to `end`, both inclusive.
    ///
    /// Returns zero when `end` is before `start`.
    pub fn business_days_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        if end < start {
            return 0;
        }
        DateRange::new(start, end)
            .iter_days()
            .filter(|d| self.is_business_day(*d))
            .count() as u32
    }

    /// Counts business days in a calendar month.
    pub fn business_days_in_month(&self, year: i32, month: u32) -> EngineResult<u32> {
        let period =
            DateRange::month(year, month).ok_or(EngineError::InvalidPeriod { year, month })?;
        Ok(self.business_days_between(period.start, period.end))
    }

    /// Returns the active holidays overlapping `range` that apply to `department`.
    pub fn get_holidays(&self, range: &DateRange, department: Option<&str>) -> Vec<&Holiday> {
        self.holidays
            .iter()
            .filter(|h| h.dates.clip(range).is_some() && h.applies_to(department))
            .collect()
    }
}
