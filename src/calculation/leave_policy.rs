//! Leave pay rates and monthly leave impact.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{DateRange, LeaveGrant, LeaveType};
use crate::rules::{RuleKey, RuleSnapshot};

use super::time_math::round_money;

/// The leave contribution to one month's pay.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LeaveImpact {
    /// Calendar days of approved leave inside the month.
    pub total_leave_days: u32,
    /// Pay for those days, rounded to 2 decimal places.
    pub leave_pay: Decimal,
    /// Days per leave type.
    pub by_type: BTreeMap<LeaveType, u32>,
}

/// Maps leave types to pay rates drawn from a rule snapshot.
#[derive(Debug, Clone)]
pub struct LeavePolicy {
    rules: RuleSnapshot,
}

impl LeavePolicy {
    /// Creates a policy over the given rules.
    pub fn new(rules: RuleSnapshot) -> Self {
        Self { rules }
    }

    /// The pay rate for a leave type. Unrecognised codes pay the unpaid rate.
    pub fn rate(&self, leave_type: LeaveType) -> Decimal {
        let key = match leave_type {
            LeaveType::Casual => RuleKey::CasualLeaveRate,
            LeaveType::Sick => RuleKey::SickLeaveRate,
            LeaveType::Earned => RuleKey::EarnedLeaveRate,
            LeaveType::Maternity => RuleKey::MaternityLeaveRate,
            LeaveType::Permission => RuleKey::PermissionLeaveRate,
            LeaveType::Unpaid | LeaveType::Unrecognized => RuleKey::UnpaidLeaveRate,
        };
        self.rules.get(key)
    }

    /// Computes the leave days and pay falling inside a month.
    ///
    /// Each approved grant is clipped to the month and its inclusive days are
    /// paid at `per_day_pay` times the grant's rate. Weekly off days inside a
    /// grant are counted.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_payroll::calculation::LeavePolicy;
    /// use attendance_payroll::models::{DateRange, LeaveGrant, LeaveType};
    /// use attendance_payroll::rules::RuleSnapshot;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let grant = LeaveGrant::approved(
    ///     "T-001",
    ///     LeaveType::Casual,
    ///     DateRange::new(
    ///         NaiveDate::from_ymd_opt(2024, 1, 28).unwrap(),
    ///         NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
    ///     ),
    /// );
    /// let policy = LeavePolicy::new(RuleSnapshot::defaults());
    /// let impact = policy
    ///     .monthly_leave_impact(&[grant], 2024, 1, Decimal::from(1000))
    ///     .unwrap();
    /// assert_eq!(impact.total_leave_days, 4);
    /// assert_eq!(impact.leave_pay, Decimal::from(4000));
    /// ```
    pub fn monthly_leave_impact(
        &self,
        grants: &[LeaveGrant],
        year: i32,
        month: u32,
        per_day_pay: Decimal,
    ) -> EngineResult<LeaveImpact> {
        let period =
            DateRange::month(year, month).ok_or(EngineError::InvalidPeriod { year, month })?;

        let mut impact = LeaveImpact::default();
        let mut pay = Decimal::ZERO;

        for grant in grants.iter().filter(|g| g.is_approved()) {
            let Some(clipped) = grant.dates.clip(&period) else {
                continue;
            };
            let days = clipped.days();
            let rate = self.rate(grant.leave_type);
            pay += Decimal::from(days) * per_day_pay * rate;
            impact.total_leave_days += days;
            *impact.by_type.entry(grant.leave_type).or_default() += days;

            debug!(
                leave_type = grant.leave_type.code(),
                days,
                %rate,
                "Leave grant applied to month"
            );
        }

        impact.leave_pay = round_money(pay);
        Ok(impact)
    }
}

/// Dates within `period` covered by an approved grant.
pub fn leave_dates(grants: &[LeaveGrant], period: &DateRange) -> BTreeSet<NaiveDate> {
    grants
        .iter()
        .filter(|g| g.is_approved())
        .filter_map(|g| g.dates.clip(period))
        .flat_map(|range| range.iter_days().collect::<Vec<_>>())
        .collect()
}
