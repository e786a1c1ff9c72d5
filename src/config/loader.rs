//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading a school's
//! attendance configuration from YAML files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Weekday;
use tracing::debug;

use crate::calculation::CalendarService;
use crate::error::{EngineError, EngineResult};
use crate::models::{Holiday, SchoolId};
use crate::rules::YamlRuleRepository;

use super::TimingSource;
use super::types::{
    HolidaysConfig, InstitutionConfig, InstitutionTiming, ShiftCatalog, ShiftsConfig,
};

/// Loads and provides access to a school's configuration.
///
/// # Directory Structure
///
/// ```text
/// config/riverside/
/// ├── institution.yaml   # school id, check-in/check-out timing, weekly off days
/// ├── shifts.yaml        # named shift windows (optional)
/// ├── holidays.yaml      # holiday records (optional)
/// └── rules/             # persisted salary rule scopes
/// ```
///
/// Institution timing is re-read from disk by [`TimingSource::current_timing`]
/// on every call, so a timing change is visible to the next classification
/// without rebuilding the loader. Everything else is refreshed by
/// [`ConfigLoader::reload`].
///
/// # Example
///
/// ```no_run
/// use attendance_payroll::config::{ConfigLoader, TimingSource};
///
/// let loader = ConfigLoader::load("./config/riverside").unwrap();
/// let timing = loader.current_timing().unwrap();
/// println!("School {} opens at {}", loader.school_id(), timing.check_in);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    root: PathBuf,
    school_id: SchoolId,
    name: String,
    weekly_off: Vec<Weekday>,
    shifts: ShiftCatalog,
    holidays: Vec<Holiday>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `institution.yaml` is missing
    /// - Any file contains invalid YAML
    /// - Any shift window is invalid
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let root = path.as_ref().to_path_buf();
        let institution = Self::load_institution(&root)?;
        // Validate the general window up front so a broken timing fails at load.
        institution.timing.general_shift()?;

        let shifts_config = Self::load_optional_yaml::<ShiftsConfig>(&root.join("shifts.yaml"))?;
        let shifts = ShiftCatalog::new(shifts_config.shifts)?;

        let holidays_config =
            Self::load_optional_yaml::<HolidaysConfig>(&root.join("holidays.yaml"))?;

        debug!(
            school_id = institution.school_id,
            shifts = shifts.shift_types().count(),
            holidays = holidays_config.holidays.len(),
            "Loaded school configuration"
        );

        Ok(Self {
            root,
            school_id: institution.school_id,
            name: institution.name,
            weekly_off: institution.weekly_off,
            shifts,
            holidays: holidays_config.holidays,
        })
    }

    /// Re-reads every file of the configuration directory.
    pub fn reload(&mut self) -> EngineResult<()> {
        *self = Self::load(&self.root)?;
        Ok(())
    }

    fn load_institution(root: &Path) -> EngineResult<InstitutionConfig> {
        Self::load_yaml::<InstitutionConfig>(&root.join("institution.yaml"))
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads a YAML file that may be absent, falling back to its default.
    fn load_optional_yaml<T: serde::de::DeserializeOwned + Default>(
        path: &Path,
    ) -> EngineResult<T> {
        if !path.exists() {
            return Ok(T::default());
        }
        Self::load_yaml(path)
    }

    /// The configuration directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configured school.
    pub fn school_id(&self) -> SchoolId {
        self.school_id
    }

    /// Display name of the school.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Weekly off days.
    pub fn weekly_off(&self) -> &[Weekday] {
        &self.weekly_off
    }

    /// Named shift windows.
    pub fn shifts(&self) -> &ShiftCatalog {
        &self.shifts
    }

    /// All holiday records in the directory, including inactive ones.
    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    /// Builds the school's calendar from the loaded holidays and weekly off days.
    pub fn calendar(&self) -> CalendarService {
        CalendarService::for_school(self.school_id, self.holidays.iter().cloned())
            .with_weekly_off(self.weekly_off.iter().copied())
    }

    /// The rule repository stored under `rules/`.
    pub fn rule_repository(&self) -> YamlRuleRepository {
        YamlRuleRepository::new(self.root.join("rules"))
    }
}

impl TimingSource for ConfigLoader {
    fn current_timing(&self) -> EngineResult<InstitutionTiming> {
        Ok(Self::load_institution(&self.root)?.timing)
    }
}
