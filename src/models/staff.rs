//! Staff pay profile model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The monetary profile of a staff member, as maintained by administrators.
///
/// # Examples
///
/// ```
/// use attendance_payroll::models::StaffPayProfile;
/// use rust_decimal::Decimal;
///
/// let mut profile = StaffPayProfile::with_basic("T-001", Decimal::from(30000));
/// profile.hra = Decimal::from(5000);
/// profile.pf_deduction = Decimal::from(1800);
/// assert_eq!(profile.allowances_total(), Decimal::from(5000));
/// assert_eq!(profile.statutory_deductions_total(), Decimal::from(1800));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffPayProfile {
    /// The staff member.
    pub staff_id: String,
    /// Department used for department-specific holidays.
    #[serde(default)]
    pub department: Option<String>,
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// House rent allowance.
    #[serde(default)]
    pub hra: Decimal,
    /// Transport allowance.
    #[serde(default)]
    pub transport_allowance: Decimal,
    /// Any other allowances.
    #[serde(default)]
    pub other_allowances: Decimal,
    /// Provident fund deduction.
    #[serde(default)]
    pub pf_deduction: Decimal,
    /// Employee state insurance deduction.
    #[serde(default)]
    pub esi_deduction: Decimal,
    /// Professional tax.
    #[serde(default)]
    pub professional_tax: Decimal,
    /// Any other deductions.
    #[serde(default)]
    pub other_deductions: Decimal,
}

impl StaffPayProfile {
    /// Creates a profile with only a basic salary set.
    pub fn with_basic(staff_id: impl Into<String>, basic_salary: Decimal) -> Self {
        Self {
            staff_id: staff_id.into(),
            department: None,
            basic_salary,
            hra: Decimal::ZERO,
            transport_allowance: Decimal::ZERO,
            other_allowances: Decimal::ZERO,
            pf_deduction: Decimal::ZERO,
            esi_deduction: Decimal::ZERO,
            professional_tax: Decimal::ZERO,
            other_deductions: Decimal::ZERO,
        }
    }

    /// Sum of the fixed monthly allowances.
    pub fn allowances_total(&self) -> Decimal {
        self.hra + self.transport_allowance + self.other_allowances
    }

    /// Sum of the fixed monthly deductions.
    pub fn statutory_deductions_total(&self) -> Decimal {
        self.pf_deduction + self.esi_deduction + self.professional_tax + self.other_deductions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_deserialize_profile_with_defaults() {
        let json = r#"{
            "staff_id": "T-042",
            "department": "mathematics",
            "basic_salary": "32000.00",
            "hra": "4000",
            "pf_deduction": "1920.50"
        }"#;

        let profile: StaffPayProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.department.as_deref(), Some("mathematics"));
        assert_eq!(profile.transport_allowance, Decimal::ZERO);
        assert_eq!(profile.allowances_total(), dec("4000"));
        assert_eq!(profile.statutory_deductions_total(), dec("1920.50"));
    }

    #[test]
    fn test_totals_sum_every_field() {
        let profile = StaffPayProfile {
            staff_id: "T-001".to_string(),
            department: None,
            basic_salary: dec("30000"),
            hra: dec("3000"),
            transport_allowance: dec("1200"),
            other_allowances: dec("800"),
            pf_deduction: dec("1800"),
            esi_deduction: dec("225"),
            professional_tax: dec("200"),
            other_deductions: dec("75"),
        };
        assert_eq!(profile.allowances_total(), dec("5000"));
        assert_eq!(profile.statutory_deductions_total(), dec("2300"));
    }
}
