//! Holiday calendar records.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DateRange;

/// Identifier of a school (institution).
pub type SchoolId = u64;

/// Who a holiday applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayScope {
    /// Applies to every department of the school.
    InstitutionWide,
    /// Applies only to the listed departments.
    DepartmentSpecific,
}

/// A holiday declared by a school administrator.
///
/// # Example
///
/// ```
/// use attendance_payroll::models::{DateRange, Holiday, HolidayScope};
/// use chrono::NaiveDate;
///
/// let holiday = Holiday::institution_wide(
///     1,
///     "Founders Day",
///     DateRange::single(NaiveDate::from_ymd_opt(2024, 8, 15).unwrap()),
/// );
/// assert_eq!(holiday.scope, HolidayScope::InstitutionWide);
/// assert!(holiday.applies_on(NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(), Some("science")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// Unique identifier of the holiday record.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// The school that declared the holiday.
    pub school_id: SchoolId,
    /// Display name.
    pub name: String,
    /// Dates covered by the holiday.
    pub dates: DateRange,
    /// Institution-wide or department-specific.
    pub scope: HolidayScope,
    /// Departments a department-specific holiday applies to.
    #[serde(default)]
    pub departments: Option<BTreeSet<String>>,
    /// Soft-delete flag; inactive holidays are ignored.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Holiday {
    /// Creates an active institution-wide holiday.
    pub fn institution_wide(school_id: SchoolId, name: impl Into<String>, dates: DateRange) -> Self {
        Self {
            id: Uuid::new_v4(),
            school_id,
            name: name.into(),
            dates,
            scope: HolidayScope::InstitutionWide,
            departments: None,
            is_active: true,
        }
    }

    /// Creates an active holiday for the given departments only.
    pub fn for_departments<I, S>(
        school_id: SchoolId,
        name: impl Into<String>,
        dates: DateRange,
        departments: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: Uuid::new_v4(),
            school_id,
            name: name.into(),
            dates,
            scope: HolidayScope::DepartmentSpecific,
            departments: Some(departments.into_iter().map(Into::into).collect()),
            is_active: true,
        }
    }

    /// Returns true if this holiday covers `department`.
    ///
    /// Institution-wide holidays cover everyone. A department-specific holiday
    /// without a department set covers nobody.
    pub fn applies_to(&self, department: Option<&str>) -> bool {
        match self.scope {
            HolidayScope::InstitutionWide => true,
            HolidayScope::DepartmentSpecific => match (department, &self.departments) {
                (Some(dept), Some(set)) => set.contains(dept),
                _ => false,
            },
        }
    }

    /// Returns true if the holiday is active, covers `date` and applies to `department`.
    pub fn applies_on(&self, date: NaiveDate, department: Option<&str>) -> bool {
        self.is_active && self.dates.contains(date) && self.applies_to(department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_department_holiday_matches_listed_department() {
        let holiday = Holiday::for_departments(
            1,
            "Lab maintenance",
            DateRange::single(date(2024, 4, 10)),
            ["science"],
        );
        assert!(holiday.applies_on(date(2024, 4, 10), Some("science")));
        assert!(!holiday.applies_on(date(2024, 4, 10), Some("arts")));
        assert!(!holiday.applies_on(date(2024, 4, 10), None));
    }

    #[test]
    fn test_department_holiday_without_set_matches_none() {
        let mut holiday = Holiday::for_departments(
            1,
            "Unassigned",
            DateRange::single(date(2024, 4, 10)),
            Vec::<String>::new(),
        );
        holiday.departments = None;
        assert!(!holiday.applies_to(Some("science")));
    }

    #[test]
    fn test_inactive_holiday_ignored() {
        let mut holiday =
            Holiday::institution_wide(1, "Cancelled", DateRange::single(date(2024, 4, 11)));
        holiday.is_active = false;
        assert!(!holiday.applies_on(date(2024, 4, 11), None));
    }

    #[test]
    fn test_holiday_yaml_defaults() {
        let yaml = r#"
school_id: 3
name: Spring break
dates:
  start: 2024-04-01
  end: 2024-04-05
scope: institution_wide
"#;
        let holiday: Holiday = serde_yaml::from_str(yaml).unwrap();
        assert!(holiday.is_active);
        assert!(holiday.departments.is_none());
        assert_eq!(holiday.dates.days(), 5);
    }
}
