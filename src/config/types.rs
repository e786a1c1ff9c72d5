//! Configuration types for attendance classification.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML files of a school configuration directory.

use std::collections::BTreeMap;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::models::{GENERAL_SHIFT, Holiday, SchoolId, ShiftWindow};

/// Institution-wide check-in/check-out configuration.
///
/// This is the single source of truth for the `general` shift window.
///
/// # Example
///
/// ```
/// use attendance_payroll::config::InstitutionTiming;
/// use chrono::NaiveTime;
///
/// let timing = InstitutionTiming::default();
/// assert_eq!(timing.check_in, NaiveTime::from_hms_opt(9, 45, 0).unwrap());
/// assert!(!timing.is_custom);
///
/// let general = timing.general_shift().unwrap();
/// assert_eq!(general.shift_type, "general");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionTiming {
    /// Expected check-in time.
    pub check_in: NaiveTime,
    /// Expected check-out time.
    pub check_out: NaiveTime,
    /// Whether an administrator has customised the timing.
    #[serde(default)]
    pub is_custom: bool,
}

impl Default for InstitutionTiming {
    fn default() -> Self {
        Self {
            check_in: NaiveTime::from_hms_opt(9, 45, 0).unwrap_or(NaiveTime::MIN),
            check_out: NaiveTime::from_hms_opt(16, 30, 0).unwrap_or(NaiveTime::MIN),
            is_custom: false,
        }
    }
}

impl InstitutionTiming {
    /// Derives the `general` shift window from this timing.
    pub fn general_shift(&self) -> EngineResult<ShiftWindow> {
        ShiftWindow::new(GENERAL_SHIFT, self.check_in, self.check_out)
    }
}

/// The contents of `institution.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct InstitutionConfig {
    /// The school this directory configures.
    pub school_id: SchoolId,
    /// Display name of the school.
    pub name: String,
    /// Check-in/check-out timing, flattened into the file.
    #[serde(flatten)]
    pub timing: InstitutionTiming,
    /// Weekly off days; Sunday when not configured.
    #[serde(default = "default_weekly_off")]
    pub weekly_off: Vec<Weekday>,
}

/// The default weekly off days.
pub fn default_weekly_off() -> Vec<Weekday> {
    vec![Weekday::Sun]
}

/// The contents of `shifts.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShiftsConfig {
    /// Named shift windows.
    #[serde(default)]
    pub shifts: Vec<ShiftWindow>,
}

/// The contents of `holidays.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HolidaysConfig {
    /// Holiday records.
    #[serde(default)]
    pub holidays: Vec<Holiday>,
}

/// Named shift windows other than `general`.
///
/// The `general` window is never stored here; it is derived from
/// [`InstitutionTiming`] each time it is needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftCatalog {
    shifts: BTreeMap<String, ShiftWindow>,
}

impl ShiftCatalog {
    /// Builds a catalog, validating every window.
    ///
    /// Entries named `general` are dropped since that window always comes
    /// from the institution timing.
    pub fn new(windows: impl IntoIterator<Item = ShiftWindow>) -> EngineResult<Self> {
        let mut shifts = BTreeMap::new();
        for window in windows {
            window.validate()?;
            if window.shift_type == GENERAL_SHIFT {
                warn!("Ignoring configured 'general' shift; it is derived from institution timing");
                continue;
            }
            shifts.insert(window.shift_type.clone(), window);
        }
        Ok(Self { shifts })
    }

    /// Looks up a named shift.
    pub fn get(&self, shift_type: &str) -> Option<&ShiftWindow> {
        self.shifts.get(shift_type)
    }

    /// Adds or replaces a named shift.
    pub fn upsert(&mut self, window: ShiftWindow) -> EngineResult<()> {
        window.validate()?;
        if window.shift_type == GENERAL_SHIFT {
            return Err(EngineError::InvalidShiftWindow {
                shift_type: window.shift_type,
                message: "the general shift is derived from institution timing".to_string(),
            });
        }
        self.shifts.insert(window.shift_type.clone(), window);
        Ok(())
    }

    /// Names of all configured shifts.
    pub fn shift_types(&self) -> impl Iterator<Item = &str> {
        self.shifts.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_institution_config_flattens_timing() {
        let yaml = r#"
school_id: 7
name: Riverside High
check_in: "08:30:00"
check_out: "15:00:00"
is_custom: true
"#;
        let config: InstitutionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.school_id, 7);
        assert_eq!(config.timing.check_in, time(8, 30));
        assert!(config.timing.is_custom);
        assert_eq!(config.weekly_off, vec![Weekday::Sun]);
    }

    #[test]
    fn test_weekly_off_is_configurable() {
        let yaml = r#"
school_id: 7
name: Riverside High
check_in: "08:30:00"
check_out: "15:00:00"
weekly_off: [Sat, Sun]
"#;
        let config: InstitutionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.weekly_off, vec![Weekday::Sat, Weekday::Sun]);
        assert!(!config.timing.is_custom);
    }

    #[test]
    fn test_catalog_drops_general_entries() {
        let catalog = ShiftCatalog::new(vec![
            ShiftWindow::new("general", time(8, 0), time(14, 0)).unwrap(),
            ShiftWindow::new("morning", time(7, 0), time(12, 0)).unwrap(),
        ])
        .unwrap();
        assert!(catalog.get("general").is_none());
        assert!(catalog.get("morning").is_some());
        assert_eq!(catalog.shift_types().collect::<Vec<_>>(), vec!["morning"]);
    }

    #[test]
    fn test_catalog_rejects_zero_length_window() {
        let broken = ShiftWindow {
            shift_type: "evening".to_string(),
            start: time(18, 0),
            end: time(18, 0),
        };
        assert!(matches!(
            ShiftCatalog::new(vec![broken]),
            Err(EngineError::InvalidShiftWindow { .. })
        ));
    }

    #[test]
    fn test_upsert_refuses_general() {
        let mut catalog = ShiftCatalog::default();
        let result = catalog.upsert(ShiftWindow::new("general", time(8, 0), time(14, 0)).unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn test_general_shift_rejects_equal_timing() {
        let timing = InstitutionTiming {
            check_in: time(9, 0),
            check_out: time(9, 0),
            is_custom: true,
        };
        assert!(timing.general_shift().is_err());
    }
}
