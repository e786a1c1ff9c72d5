//! Rule names and their hardcoded defaults.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A named salary rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKey {
    /// Bonus per hour of arrival before shift start.
    EarlyArrivalBonusPerHour,
    /// Penalty per hour of departure before shift end.
    EarlyDeparturePenaltyPerHour,
    /// Penalty per hour of arrival after shift start.
    LateArrivalPenaltyPerHour,
    /// Fraction of a day's pay lost per absent day.
    AbsentDeductionRate,
    /// Multiplier applied to the hourly rate for overtime.
    OvertimeMultiplier,
    /// Fraction of a day's pay earned per on-duty day.
    OnDutyPayRate,
    /// Pay rate for sick leave.
    SickLeaveRate,
    /// Pay rate for casual leave.
    CasualLeaveRate,
    /// Pay rate for earned leave.
    EarnedLeaveRate,
    /// Pay rate for maternity leave.
    MaternityLeaveRate,
    /// Pay rate for unpaid (and unrecognised) leave.
    UnpaidLeaveRate,
    /// Pay rate for permission leave.
    PermissionLeaveRate,
    /// Percentage of the hourly rate paid as bonus per extra hour.
    BonusRatePercentage,
    /// Extra hours required before the extra-hours bonus applies.
    MinimumHoursForBonus,
}

impl RuleKey {
    /// Every rule, in a stable order.
    pub const ALL: [RuleKey; 14] = [
        RuleKey::EarlyArrivalBonusPerHour,
        RuleKey::EarlyDeparturePenaltyPerHour,
        RuleKey::LateArrivalPenaltyPerHour,
        RuleKey::AbsentDeductionRate,
        RuleKey::OvertimeMultiplier,
        RuleKey::OnDutyPayRate,
        RuleKey::SickLeaveRate,
        RuleKey::CasualLeaveRate,
        RuleKey::EarnedLeaveRate,
        RuleKey::MaternityLeaveRate,
        RuleKey::UnpaidLeaveRate,
        RuleKey::PermissionLeaveRate,
        RuleKey::BonusRatePercentage,
        RuleKey::MinimumHoursForBonus,
    ];

    /// The persisted name of the rule.
    pub fn name(&self) -> &'static str {
        match self {
            RuleKey::EarlyArrivalBonusPerHour => "early_arrival_bonus_per_hour",
            RuleKey::EarlyDeparturePenaltyPerHour => "early_departure_penalty_per_hour",
            RuleKey::LateArrivalPenaltyPerHour => "late_arrival_penalty_per_hour",
            RuleKey::AbsentDeductionRate => "absent_deduction_rate",
            RuleKey::OvertimeMultiplier => "overtime_multiplier",
            RuleKey::OnDutyPayRate => "on_duty_pay_rate",
            RuleKey::SickLeaveRate => "sick_leave_rate",
            RuleKey::CasualLeaveRate => "casual_leave_rate",
            RuleKey::EarnedLeaveRate => "earned_leave_rate",
            RuleKey::MaternityLeaveRate => "maternity_leave_rate",
            RuleKey::UnpaidLeaveRate => "unpaid_leave_rate",
            RuleKey::PermissionLeaveRate => "permission_leave_rate",
            RuleKey::BonusRatePercentage => "bonus_rate_percentage",
            RuleKey::MinimumHoursForBonus => "minimum_hours_for_bonus",
        }
    }

    /// The value used when no scope has the rule.
    pub fn default_value(&self) -> Decimal {
        match self {
            RuleKey::EarlyArrivalBonusPerHour => Decimal::from(50),
            RuleKey::EarlyDeparturePenaltyPerHour => Decimal::from(100),
            RuleKey::LateArrivalPenaltyPerHour => Decimal::from(100),
            RuleKey::AbsentDeductionRate => Decimal::ONE,
            RuleKey::OvertimeMultiplier => Decimal::new(15, 1),
            RuleKey::OnDutyPayRate => Decimal::ONE,
            RuleKey::SickLeaveRate
            | RuleKey::CasualLeaveRate
            | RuleKey::EarnedLeaveRate
            | RuleKey::MaternityLeaveRate
            | RuleKey::PermissionLeaveRate => Decimal::ONE,
            RuleKey::UnpaidLeaveRate => Decimal::ZERO,
            RuleKey::BonusRatePercentage => Decimal::from(50),
            RuleKey::MinimumHoursForBonus => Decimal::from(5),
        }
    }
}

impl std::fmt::Display for RuleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuleKey {
    type Err = EngineError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        RuleKey::ALL
            .iter()
            .copied()
            .find(|key| key.name() == name)
            .ok_or_else(|| EngineError::UnknownRule {
                name: name.to_string(),
            })
    }
}
