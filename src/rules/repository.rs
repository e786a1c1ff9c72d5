//! Persistence seam for salary rules.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::SchoolId;

use super::RuleKey;

/// The values stored for one scope.
pub type RuleSet = BTreeMap<RuleKey, Decimal>;

/// Where a rule set lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    /// Applies to every school without its own value.
    Global,
    /// Applies to one school.
    School(SchoolId),
}

impl std::fmt::Display for RuleScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleScope::Global => f.write_str("global"),
            RuleScope::School(id) => write!(f, "school_{}", id),
        }
    }
}

/// Storage for per-scope rule sets.
///
/// Each scope is an independent row: `merge` on one scope must never touch
/// another, and must be atomic with respect to other merges on the same scope.
pub trait RuleRepository {
    /// Returns the values persisted for `scope`, empty if none.
    fn load(&self, scope: RuleScope) -> EngineResult<RuleSet>;

    /// Merges `partial` into the values of `scope`, persists them and returns the result.
    fn merge(&self, scope: RuleScope, partial: &RuleSet) -> EngineResult<RuleSet>;
}

fn lock_poisoned() -> EngineError {
    EngineError::Storage {
        message: "rule repository lock poisoned".to_string(),
    }
}

/// A process-local repository, for tests and embedding hosts.
#[derive(Debug, Default)]
pub struct InMemoryRuleRepository {
    scopes: Mutex<HashMap<RuleScope, RuleSet>>,
}

impl InMemoryRuleRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RuleRepository for InMemoryRuleRepository {
    fn load(&self, scope: RuleScope) -> EngineResult<RuleSet> {
        let scopes = self.scopes.lock().map_err(|_| lock_poisoned())?;
        Ok(scopes.get(&scope).cloned().unwrap_or_default())
    }

    fn merge(&self, scope: RuleScope, partial: &RuleSet) -> EngineResult<RuleSet> {
        let mut scopes = self.scopes.lock().map_err(|_| lock_poisoned())?;
        let rules = scopes.entry(scope).or_default();
        rules.extend(partial.iter().map(|(k, v)| (*k, *v)));
        Ok(rules.clone())
    }
}

/// On-disk format of a scope file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: BTreeMap<String, Decimal>,
}

/// A repository keeping one YAML file per scope in a directory.
///
/// ```text
/// rules/
/// ├── global.yaml
/// └── school_1.yaml
/// ```
///
/// Writes go to a temporary file that is renamed over the scope file, so a
/// reader never sees a half-written scope.
#[derive(Debug)]
pub struct YamlRuleRepository {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl YamlRuleRepository {
    /// Creates a repository rooted at `dir`. The directory is created on first write.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    fn scope_path(&self, scope: RuleScope) -> PathBuf {
        self.dir.join(format!("{}.yaml", scope))
    }

    fn read_scope(&self, scope: RuleScope) -> EngineResult<RuleSet> {
        let path = self.scope_path(scope);
        if !path.exists() {
            return Ok(RuleSet::new());
        }
        let path_str = path.display().to_string();
        let content = fs::read_to_string(&path).map_err(|e| EngineError::Storage {
            message: format!("failed to read {}: {}", path_str, e),
        })?;
        let file: RuleFile =
            serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
                path: path_str.clone(),
                message: e.to_string(),
            })?;

        let mut rules = RuleSet::new();
        for (name, value) in file.rules {
            match name.parse::<RuleKey>() {
                Ok(key) => {
                    rules.insert(key, value);
                }
                Err(_) => warn!(path = %path_str, rule = %name, "Skipping unknown persisted rule"),
            }
        }
        Ok(rules)
    }

    fn write_scope(&self, scope: RuleScope, rules: &RuleSet) -> EngineResult<()> {
        let storage_err = |e: std::io::Error| EngineError::Storage {
            message: format!("failed to write rules for {}: {}", scope, e),
        };

        fs::create_dir_all(&self.dir).map_err(storage_err)?;

        let file = RuleFile {
            rules: rules.iter().map(|(k, v)| (k.name().to_string(), *v)).collect(),
        };
        let yaml = serde_yaml::to_string(&file).map_err(|e| EngineError::Storage {
            message: e.to_string(),
        })?;

        let path = self.scope_path(scope);
        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml).map_err(storage_err)?;
        fs::rename(&tmp, &path).map_err(storage_err)?;
        debug!(scope = %scope, rules = rules.len(), "Persisted rule scope");
        Ok(())
    }
}

impl RuleRepository for YamlRuleRepository {
    fn load(&self, scope: RuleScope) -> EngineResult<RuleSet> {
        self.read_scope(scope)
    }

    fn merge(&self, scope: RuleScope, partial: &RuleSet) -> EngineResult<RuleSet> {
        let _guard = self.write_lock.lock().map_err(|_| lock_poisoned())?;
        let mut rules = self.read_scope(scope)?;
        rules.extend(partial.iter().map(|(k, v)| (*k, *v)));
        self.write_scope(scope, &rules)?;
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("attendance-rules-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_scope_file_names() {
        assert_eq!(RuleScope::Global.to_string(), "global");
        assert_eq!(RuleScope::School(12).to_string(), "school_12");
    }

    #[test]
    fn test_in_memory_merge_keeps_existing_keys() {
        let repo = InMemoryRuleRepository::new();
        let scope = RuleScope::School(1);
        repo.merge(scope, &RuleSet::from([(RuleKey::OvertimeMultiplier, dec("2"))]))
            .unwrap();
        let merged = repo
            .merge(scope, &RuleSet::from([(RuleKey::OnDutyPayRate, dec("0.8"))]))
            .unwrap();

        assert_eq!(merged.get(&RuleKey::OvertimeMultiplier), Some(&dec("2")));
        assert_eq!(merged.get(&RuleKey::OnDutyPayRate), Some(&dec("0.8")));
    }

    #[test]
    fn test_in_memory_scopes_are_independent() {
        let repo = InMemoryRuleRepository::new();
        repo.merge(
            RuleScope::School(1),
            &RuleSet::from([(RuleKey::EarlyArrivalBonusPerHour, dec("150"))]),
        )
        .unwrap();

        assert!(repo.load(RuleScope::School(2)).unwrap().is_empty());
        assert!(repo.load(RuleScope::Global).unwrap().is_empty());
    }

    #[test]
    fn test_yaml_repository_round_trip() {
        let dir = scratch_dir();
        let repo = YamlRuleRepository::new(&dir);
        repo.merge(
            RuleScope::Global,
            &RuleSet::from([(RuleKey::LateArrivalPenaltyPerHour, dec("75.5"))]),
        )
        .unwrap();

        let fresh = YamlRuleRepository::new(&dir);
        let loaded = fresh.load(RuleScope::Global).unwrap();
        assert_eq!(loaded.get(&RuleKey::LateArrivalPenaltyPerHour), Some(&dec("75.5")));
        assert!(!dir.join("global.yaml.tmp").exists());
    }

    #[test]
    fn test_yaml_repository_missing_dir_is_empty() {
        let repo = YamlRuleRepository::new(scratch_dir());
        assert!(repo.load(RuleScope::School(3)).unwrap().is_empty());
    }

    #[test]
    fn test_yaml_repository_skips_unknown_rules() {
        let dir = scratch_dir();
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("global.yaml"),
            "rules:\n  overtime_multiplier: 2.0\n  legacy_bonus: 10\n",
        )
        .unwrap();

        let loaded = YamlRuleRepository::new(&dir).load(RuleScope::Global).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(&RuleKey::OvertimeMultiplier), Some(&dec("2.0")));
    }

    #[test]
    fn test_yaml_repository_rejects_corrupt_file() {
        let dir = scratch_dir();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("school_4.yaml"), "rules: [not, a, map]\n").unwrap();

        let result = YamlRuleRepository::new(&dir).load(RuleScope::School(4));
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }
}
