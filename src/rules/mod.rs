//! Salary rule configuration.
//!
//! Rules are named numeric values (bonus rates, penalty rates, multipliers)
//! scoped per school with a global scope as fallback and hardcoded defaults
//! beneath that. This module provides the rule names and defaults, the
//! persistence seam, and the [`SalaryRuleStore`] that resolves them.

mod keys;
mod repository;
mod store;

pub use keys::RuleKey;
pub use repository::{
    InMemoryRuleRepository, RuleRepository, RuleScope, RuleSet, YamlRuleRepository,
};
pub use store::{ResolvedRule, RuleSnapshot, RuleSource, SalaryRuleStore};
