//! Scoped salary rule resolution.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::SchoolId;

use super::{RuleKey, RuleRepository, RuleScope, RuleSet};

/// Which level supplied a resolved rule value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
    /// The school's own scope.
    School,
    /// The global scope.
    Global,
    /// The hardcoded default.
    Default,
}

/// A rule together with its resolved value and origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRule {
    /// The rule.
    pub key: RuleKey,
    /// The value in effect.
    pub value: Decimal,
    /// Where the value came from.
    pub source: RuleSource,
}

/// Every rule resolved at one instant.
///
/// Salary computations take one snapshot per call so a single computation
/// sees a consistent rule set while still picking up changes made between
/// calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSnapshot {
    values: BTreeMap<RuleKey, Decimal>,
}

impl RuleSnapshot {
    /// A snapshot holding only the hardcoded defaults.
    pub fn defaults() -> Self {
        Self {
            values: RuleKey::ALL
                .iter()
                .map(|k| (*k, k.default_value()))
                .collect(),
        }
    }

    /// The value of `key` in this snapshot.
    pub fn get(&self, key: RuleKey) -> Decimal {
        self.values
            .get(&key)
            .copied()
            .unwrap_or_else(|| key.default_value())
    }

    /// Returns a copy with `key` set to `value`.
    pub fn with(mut self, key: RuleKey, value: Decimal) -> Self {
        self.values.insert(key, value);
        self
    }
}

/// Resolves and updates salary rules for one scope.
///
/// Lookups fall back from the school scope to the global scope to the
/// hardcoded default. Nothing is cached: every call reads the repository.
///
/// # Example
///
/// ```
/// use attendance_payroll::rules::{InMemoryRuleRepository, RuleKey, SalaryRuleStore};
/// use rust_decimal::Decimal;
/// use std::collections::HashMap;
///
/// let repo = InMemoryRuleRepository::new();
/// let school_one = SalaryRuleStore::new(&repo, Some(1));
/// school_one
///     .update(&HashMap::from([(
///         "early_arrival_bonus_per_hour".to_string(),
///         Decimal::from(150),
///     )]))
///     .unwrap();
///
/// let school_two = SalaryRuleStore::new(&repo, Some(2));
/// assert_eq!(
///     school_two.get(RuleKey::EarlyArrivalBonusPerHour).unwrap(),
///     RuleKey::EarlyArrivalBonusPerHour.default_value()
/// );
/// ```
pub struct SalaryRuleStore<'a> {
    repository: &'a dyn RuleRepository,
    school_id: Option<SchoolId>,
}

impl<'a> SalaryRuleStore<'a> {
    /// Creates a store for `school_id`, or for the global scope when `None`.
    pub fn new(repository: &'a dyn RuleRepository, school_id: Option<SchoolId>) -> Self {
        Self {
            repository,
            school_id,
        }
    }

    /// The scope that `update` writes to.
    pub fn scope(&self) -> RuleScope {
        match self.school_id {
            Some(id) => RuleScope::School(id),
            None => RuleScope::Global,
        }
    }

    /// Resolves a single rule.
    pub fn get(&self, key: RuleKey) -> EngineResult<Decimal> {
        let (school, global) = self.load_layers()?;
        Ok(Self::resolve(key, school.as_ref(), &global).0)
    }

    /// Resolves a rule by its persisted name.
    pub fn get_named(&self, name: &str) -> EngineResult<Decimal> {
        self.get(name.parse()?)
    }

    /// Resolves every rule, reporting where each value came from.
    pub fn resolved(&self) -> EngineResult<Vec<ResolvedRule>> {
        let (school, global) = self.load_layers()?;
        Ok(RuleKey::ALL
            .iter()
            .map(|key| {
                let (value, source) = Self::resolve(*key, school.as_ref(), &global);
                ResolvedRule {
                    key: *key,
                    value,
                    source,
                }
            })
            .collect())
    }

    /// Resolves every rule into a snapshot for one computation.
    pub fn snapshot(&self) -> EngineResult<RuleSnapshot> {
        let values = self
            .resolved()?
            .into_iter()
            .map(|r| (r.key, r.value))
            .collect();
        Ok(RuleSnapshot { values })
    }

    /// Merges `partial` into this store's scope.
    ///
    /// Only the supplied rules change. The whole update is rejected, and
    /// nothing is written, if any name is unknown or any value is negative.
    pub fn update(&self, partial: &HashMap<String, Decimal>) -> EngineResult<RuleSet> {
        let mut parsed = RuleSet::new();
        for (name, value) in partial {
            let key = name.parse::<RuleKey>().inspect_err(|_| {
                warn!(scope = %self.scope(), rule = %name, "Rejected update with unknown rule");
            })?;
            if *value < Decimal::ZERO {
                warn!(scope = %self.scope(), rule = %name, value = %value, "Rejected negative rule value");
                return Err(EngineError::InvalidRuleValue {
                    name: name.clone(),
                    message: "must not be negative".to_string(),
                });
            }
            parsed.insert(key, *value);
        }

        let merged = self.repository.merge(self.scope(), &parsed)?;
        info!(
            scope = %self.scope(),
            updated = parsed.len(),
            stored = merged.len(),
            "Salary rules updated"
        );
        Ok(merged)
    }

    fn load_layers(&self) -> EngineResult<(Option<RuleSet>, RuleSet)> {
        let school = match self.school_id {
            Some(id) => Some(self.repository.load(RuleScope::School(id))?),
            None => None,
        };
        let global = self.repository.load(RuleScope::Global)?;
        Ok((school, global))
    }

    fn resolve(key: RuleKey, school: Option<&RuleSet>, global: &RuleSet) -> (Decimal, RuleSource) {
        if let Some(value) = school.and_then(|s| s.get(&key)) {
            return (*value, RuleSource::School);
        }
        if let Some(value) = global.get(&key) {
            return (*value, RuleSource::Global);
        }
        debug!(rule = %key, "Using default rule value");
        (key.default_value(), RuleSource::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{InMemoryRuleRepository, YamlRuleRepository};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn update(store: &SalaryRuleStore<'_>, name: &str, value: &str) -> EngineResult<RuleSet> {
        store.update(&HashMap::from([(name.to_string(), dec(value))]))
    }

    /// RS-001: school write does not leak to other schools or global
    #[test]
    fn test_school_update_is_isolated() {
        let repo = InMemoryRuleRepository::new();
        let school_one = SalaryRuleStore::new(&repo, Some(1));
        update(&school_one, "early_arrival_bonus_per_hour", "150").unwrap();

        let school_two = SalaryRuleStore::new(&repo, Some(2));
        let global = SalaryRuleStore::new(&repo, None);

        assert_eq!(
            school_one.get(RuleKey::EarlyArrivalBonusPerHour).unwrap(),
            dec("150")
        );
        assert_eq!(
            school_two.get(RuleKey::EarlyArrivalBonusPerHour).unwrap(),
            RuleKey::EarlyArrivalBonusPerHour.default_value()
        );
        assert_eq!(
            global.get(RuleKey::EarlyArrivalBonusPerHour).unwrap(),
            RuleKey::EarlyArrivalBonusPerHour.default_value()
        );
    }

    /// RS-002: school falls back to global before default
    #[test]
    fn test_school_falls_back_to_global() {
        let repo = InMemoryRuleRepository::new();
        let global = SalaryRuleStore::new(&repo, None);
        update(&global, "overtime_multiplier", "2").unwrap();

        let school = SalaryRuleStore::new(&repo, Some(5));
        assert_eq!(school.get(RuleKey::OvertimeMultiplier).unwrap(), dec("2"));

        update(&school, "overtime_multiplier", "1.75").unwrap();
        assert_eq!(school.get(RuleKey::OvertimeMultiplier).unwrap(), dec("1.75"));
        assert_eq!(global.get(RuleKey::OvertimeMultiplier).unwrap(), dec("2"));
    }

    /// RS-003: global write is not masked by an unrelated school value
    #[test]
    fn test_global_update_does_not_touch_school_scope() {
        let repo = InMemoryRuleRepository::new();
        let school = SalaryRuleStore::new(&repo, Some(1));
        update(&school, "on_duty_pay_rate", "0.9").unwrap();

        let global = SalaryRuleStore::new(&repo, None);
        update(&global, "on_duty_pay_rate", "0.5").unwrap();

        assert_eq!(school.get(RuleKey::OnDutyPayRate).unwrap(), dec("0.9"));
        assert_eq!(global.get(RuleKey::OnDutyPayRate).unwrap(), dec("0.5"));
    }

    #[test]
    fn test_partial_update_preserves_other_keys() {
        let repo = InMemoryRuleRepository::new();
        let store = SalaryRuleStore::new(&repo, Some(1));
        update(&store, "late_arrival_penalty_per_hour", "60").unwrap();
        update(&store, "early_departure_penalty_per_hour", "40").unwrap();

        assert_eq!(store.get(RuleKey::LateArrivalPenaltyPerHour).unwrap(), dec("60"));
        assert_eq!(store.get(RuleKey::EarlyDeparturePenaltyPerHour).unwrap(), dec("40"));
    }

    #[test]
    fn test_unknown_rule_rejects_whole_update() {
        let repo = InMemoryRuleRepository::new();
        let store = SalaryRuleStore::new(&repo, Some(1));
        let result = store.update(&HashMap::from([
            ("overtime_multiplier".to_string(), dec("3")),
            ("bonus".to_string(), dec("150")),
        ]));

        assert!(matches!(result, Err(EngineError::UnknownRule { .. })));
        assert_eq!(
            store.get(RuleKey::OvertimeMultiplier).unwrap(),
            RuleKey::OvertimeMultiplier.default_value()
        );
    }

    #[test]
    fn test_negative_value_rejected() {
        let repo = InMemoryRuleRepository::new();
        let store = SalaryRuleStore::new(&repo, None);
        let result = update(&store, "absent_deduction_rate", "-0.5");
        assert!(matches!(result, Err(EngineError::InvalidRuleValue { .. })));
    }

    #[test]
    fn test_get_named() {
        let repo = InMemoryRuleRepository::new();
        let store = SalaryRuleStore::new(&repo, None);
        assert_eq!(store.get_named("unpaid_leave_rate").unwrap(), Decimal::ZERO);
        assert!(store.get_named("nope").is_err());
    }

    #[test]
    fn test_resolved_reports_sources() {
        let repo = InMemoryRuleRepository::new();
        update(&SalaryRuleStore::new(&repo, None), "sick_leave_rate", "0.5").unwrap();
        let store = SalaryRuleStore::new(&repo, Some(3));
        update(&store, "casual_leave_rate", "0.75").unwrap();

        let resolved = store.resolved().unwrap();
        assert_eq!(resolved.len(), RuleKey::ALL.len());

        let source_of = |key: RuleKey| resolved.iter().find(|r| r.key == key).unwrap().source;
        assert_eq!(source_of(RuleKey::CasualLeaveRate), RuleSource::School);
        assert_eq!(source_of(RuleKey::SickLeaveRate), RuleSource::Global);
        assert_eq!(source_of(RuleKey::EarnedLeaveRate), RuleSource::Default);
    }

    #[test]
    fn test_snapshot_sees_updates_between_calls() {
        let repo = InMemoryRuleRepository::new();
        let store = SalaryRuleStore::new(&repo, Some(1));
        let before = store.snapshot().unwrap();
        update(&store, "bonus_rate_percentage", "25").unwrap();
        let after = store.snapshot().unwrap();

        assert_eq!(before.get(RuleKey::BonusRatePercentage), dec("50"));
        assert_eq!(after.get(RuleKey::BonusRatePercentage), dec("25"));
    }

    #[test]
    fn test_fresh_store_reproduces_persisted_values() {
        let dir = std::env::temp_dir().join(format!("attendance-store-{}", uuid::Uuid::new_v4()));
        {
            let repo = YamlRuleRepository::new(&dir);
            let store = SalaryRuleStore::new(&repo, Some(8));
            update(&store, "minimum_hours_for_bonus", "6.5").unwrap();
        }

        let repo = YamlRuleRepository::new(&dir);
        let store = SalaryRuleStore::new(&repo, Some(8));
        assert_eq!(store.get(RuleKey::MinimumHoursForBonus).unwrap(), dec("6.5"));
    }
}
