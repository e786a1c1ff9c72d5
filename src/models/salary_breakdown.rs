//! Salary breakdown models.
//!
//! This module contains the [`SalaryBreakdown`] type and its associated structures
//! that capture all outputs of a monthly salary computation, including day counts,
//! earnings, deductions, the hours summary of the hours-based mode, and an audit
//! trace.
//!
//! A breakdown is a value object: it is never persisted and holds no timestamps
//! or random identifiers, so identical inputs produce identical output.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which computation mode produced a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputationMode {
    /// Pro-rated by present/absent/leave/on-duty day counts.
    DayBased,
    /// Pro-rated by actual versus standard hours worked.
    HoursBased,
}

/// Day tallies over the business days of the month.
///
/// For every month `present_days + absent_days + leave_days + on_duty_days`
/// equals `working_days`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayCounts {
    /// Business days in the month.
    pub working_days: u32,
    /// Business days attended (present, late, left early) or worked through a department holiday.
    pub present_days: u32,
    /// Business days counted as absent, including imputed ones.
    pub absent_days: u32,
    /// Absent days that had no attendance record at all.
    pub imputed_absent_days: u32,
    /// Business days covered by leave.
    pub leave_days: u32,
    /// Business days on approved duty.
    pub on_duty_days: u32,
}

/// The earnings side of a breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Earnings {
    /// Pay for attended days (day-based) or hours-ratio pay (hours-based).
    pub basic_earned: Decimal,
    /// Pay for on-duty days.
    pub on_duty_pay: Decimal,
    /// Pay for approved leave.
    pub leave_pay: Decimal,
    /// Bonus for arriving before shift start.
    pub early_arrival_bonus: Decimal,
    /// Overtime pay.
    pub overtime_pay: Decimal,
    /// Bonus for surplus hours (hours-based mode only).
    pub extra_hours_bonus: Decimal,
    /// House rent allowance.
    pub hra: Decimal,
    /// Transport allowance.
    pub transport_allowance: Decimal,
    /// Other allowances.
    pub other_allowances: Decimal,
    /// Sum of all earnings.
    pub total: Decimal,
}

/// The deductions side of a breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Deductions {
    /// Deduction for absent days (day-based mode only).
    pub absent_deduction: Decimal,
    /// Penalty for leaving before shift end.
    pub early_departure_penalty: Decimal,
    /// Penalty for arriving after shift start.
    pub late_arrival_penalty: Decimal,
    /// Provident fund.
    pub pf: Decimal,
    /// Employee state insurance.
    pub esi: Decimal,
    /// Professional tax.
    pub professional_tax: Decimal,
    /// Other deductions.
    pub other: Decimal,
    /// Sum of all deductions.
    pub total: Decimal,
}

/// Hours figures reported by the hours-based mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursSummary {
    /// Length of the institution's general shift.
    pub standard_daily_hours: Decimal,
    /// Standard daily hours times business days.
    pub standard_monthly_hours: Decimal,
    /// Hours actually credited for the month.
    pub actual_hours_worked: Decimal,
    /// Actual over standard hours, uncapped.
    pub hours_ratio: Decimal,
    /// Hours beyond the standard month.
    pub extra_hours_worked: Decimal,
    /// Bonus paid for the extra hours, zero below the threshold.
    pub bonus_for_extra_hours: Decimal,
}

/// A single step in the audit trace recording a computation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// Stable identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during computation.
///
/// Warnings mark records the engine recovered from rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The attendance date the warning refers to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// The audit trace of a computation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of computation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during computation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// Appends a step, numbering it after the last one.
    pub fn push_step(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: String,
    ) {
        let step_number = self.steps.len() as u32 + 1;
        self.steps.push(AuditStep {
            step_number,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            input,
            output,
            reasoning,
        });
    }

    /// Appends a warning.
    pub fn warn(&mut self, code: &str, message: String, date: Option<NaiveDate>) {
        self.warnings.push(AuditWarning {
            code: code.to_string(),
            message,
            date,
        });
    }
}

/// The complete result of a monthly salary computation.
///
/// # Example
///
/// ```
/// use attendance_payroll::models::{
///     AuditTrace, ComputationMode, DayCounts, Deductions, Earnings, SalaryBreakdown,
/// };
/// use rust_decimal::Decimal;
///
/// let breakdown = SalaryBreakdown {
///     staff_id: "T-001".to_string(),
///     year: 2024,
///     month: 1,
///     mode: ComputationMode::DayBased,
///     per_day_salary: Decimal::ZERO,
///     per_hour_salary: Decimal::ZERO,
///     days: DayCounts::default(),
///     paid_leave_days: 0,
///     late_minutes: 0,
///     early_departure_minutes: 0,
///     early_arrival_minutes: 0,
///     overtime_hours: Decimal::ZERO,
///     earnings: Earnings::default(),
///     deductions: Deductions::default(),
///     net_salary: Decimal::ZERO,
///     hours: None,
///     audit_trace: AuditTrace::default(),
/// };
/// assert!(breakdown.hours.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    /// The staff member.
    pub staff_id: String,
    /// Year of the pay month.
    pub year: i32,
    /// Pay month (1-12).
    pub month: u32,
    /// Mode that produced the breakdown.
    pub mode: ComputationMode,
    /// Basic salary divided by business days.
    pub per_day_salary: Decimal,
    /// Hourly rate used for minute-based adjustments and overtime.
    pub per_hour_salary: Decimal,
    /// Day tallies.
    pub days: DayCounts,
    /// Calendar days of approved leave inside the month.
    pub paid_leave_days: u32,
    /// Total late minutes across the month.
    pub late_minutes: u32,
    /// Total early-departure minutes across the month.
    pub early_departure_minutes: u32,
    /// Total early-arrival minutes across the month.
    pub early_arrival_minutes: u32,
    /// Total overtime hours across the month.
    pub overtime_hours: Decimal,
    /// Earnings.
    pub earnings: Earnings,
    /// Deductions.
    pub deductions: Deductions,
    /// Earnings total minus deductions total.
    pub net_salary: Decimal,
    /// Hours figures, present only for the hours-based mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<HoursSummary>,
    /// Audit trace of the computation.
    pub audit_trace: AuditTrace,
}
