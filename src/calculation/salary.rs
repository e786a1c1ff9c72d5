//! Monthly salary computation.
//!
//! This module provides the [`SalaryComputer`] entry point and the day-based
//! mode, along with the pieces both modes share: the month frame, the
//! business-day tally, and the minute-based adjustments. The hours-based mode
//! lives in `salary_enhanced`.
//!
//! Both modes are pure reducers over [`MonthlyInputs`]: they never modify an
//! attendance record and identical inputs give identical breakdowns.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::TimingSource;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceDay, AttendanceStatus, AuditTrace, ComputationMode, DateRange, DayCounts,
    Deductions, Earnings, HoursSummary, LeaveGrant, SalaryBreakdown, ShiftWindow,
    StaffPayProfile,
};
use crate::rules::{RuleKey, RuleSnapshot, SalaryRuleStore};

use super::leave_policy::{LeaveImpact, LeavePolicy, leave_dates};
use super::records::PayrollRecords;
use super::shift_clock::live_general_shift;
use super::time_math::{early_arrival_minutes, minutes_to_hours, round_hours, round_money};
use super::CalendarService;

/// Standard hours in a day for the day-based hourly rate.
pub const DAY_BASED_HOURS_PER_DAY: u32 = 8;

/// Warning code for a stored value that could not be interpreted.
pub const WARN_DATA_INCONSISTENCY: &str = "DATA_INCONSISTENCY";
/// Warning code for a second record on the same date.
pub const WARN_DUPLICATE_RECORD: &str = "DUPLICATE_RECORD";
/// Warning code for a record that does not belong to the staff member and month.
pub const WARN_RECORD_IGNORED: &str = "RECORD_IGNORED";
/// Warning code for an attended day without both punches.
pub const WARN_INCOMPLETE_PUNCH: &str = "INCOMPLETE_PUNCH";

/// Everything one monthly computation reads, already fetched.
#[derive(Debug, Clone)]
pub struct MonthlyInputs {
    /// Year of the pay month.
    pub year: i32,
    /// Pay month (1-12).
    pub month: u32,
    /// The staff member's pay profile.
    pub profile: StaffPayProfile,
    /// The month's attendance rows.
    pub attendance: Vec<AttendanceDay>,
    /// Leave grants overlapping the month.
    pub leave_grants: Vec<LeaveGrant>,
    /// Rules resolved for the staff member's school.
    pub rules: RuleSnapshot,
    /// The institution's `general` shift at computation time.
    pub general_shift: ShiftWindow,
}

/// The validated month a computation runs over.
pub(super) struct MonthFrame<'i> {
    pub period: DateRange,
    pub working_days: u32,
    /// One record per date, belonging to the staff member and month.
    pub records: Vec<&'i AttendanceDay>,
    /// Leave grants belonging to the staff member.
    pub grants: Vec<LeaveGrant>,
    pub trace: AuditTrace,
}

/// How one business day counts towards pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DayBucket {
    /// Present, late or left early.
    Attended,
    /// A holiday for the staff member's department, or a record classified as one.
    PaidHoliday,
    Leave,
    OnDuty,
    /// An absent or unrecognised record.
    Absent,
    /// No record and nothing else covering the day.
    ImputedAbsent,
}

impl DayBucket {
    /// Record status wins, then approved leave, then a department holiday.
    pub(super) fn of(status: Option<AttendanceStatus>, on_leave: bool, holiday: bool) -> Self {
        match status {
            Some(AttendanceStatus::Leave) => DayBucket::Leave,
            Some(AttendanceStatus::OnDuty) => DayBucket::OnDuty,
            Some(AttendanceStatus::Holiday) => DayBucket::PaidHoliday,
            Some(s) if s.is_attended() => DayBucket::Attended,
            _ if on_leave => DayBucket::Leave,
            _ if holiday => DayBucket::PaidHoliday,
            None => DayBucket::ImputedAbsent,
            Some(_) => DayBucket::Absent,
        }
    }
}

/// Late, early and overtime figures summed over attended records.
#[derive(Debug, Clone, Default)]
pub(super) struct Adjustments {
    pub late_minutes: u32,
    pub early_departure_minutes: u32,
    pub early_arrival_minutes: u32,
    pub overtime_hours: Decimal,
    pub early_arrival_bonus: Decimal,
    pub early_departure_penalty: Decimal,
    pub late_arrival_penalty: Decimal,
    pub overtime_pay: Decimal,
}

/// The mode-specific amounts handed to [`BreakdownParts::finish`].
pub(super) struct BreakdownParts {
    pub mode: ComputationMode,
    pub per_day_salary: Decimal,
    pub per_hour_salary: Decimal,
    pub days: DayCounts,
    pub basic_earned: Decimal,
    pub on_duty_pay: Decimal,
    pub extra_hours_bonus: Decimal,
    pub absent_deduction: Decimal,
    pub leave: LeaveImpact,
    pub adjustments: Adjustments,
    pub hours: Option<HoursSummary>,
}

fn money_json(amount: Decimal) -> String {
    amount.normalize().to_string()
}

impl MonthlyInputs {
    /// Validates the month and selects the records to use.
    ///
    /// Rows for other staff members or months, and repeated dates, are
    /// skipped with a warning; the first row for a date wins. Leave grants
    /// for other staff members are skipped the same way.
    pub(super) fn frame(&self, calendar: &CalendarService) -> EngineResult<MonthFrame<'_>> {
        let (year, month) = (self.year, self.month);
        let period =
            DateRange::month(year, month).ok_or(EngineError::InvalidPeriod { year, month })?;
        let working_days = calendar.business_days_in_month(year, month)?;
        if working_days == 0 {
            return Err(EngineError::NoBusinessDays { year, month });
        }

        let mut trace = AuditTrace::default();
        let mut seen = BTreeSet::new();
        let mut records = Vec::with_capacity(self.attendance.len());

        for day in &self.attendance {
            if day.staff_id != self.profile.staff_id || !period.contains(day.date) {
                warn!(staff_id = %day.staff_id, date = %day.date, "Ignoring attendance row outside the computation");
                trace.warn(
                    WARN_RECORD_IGNORED,
                    format!("Row for '{}' on {} is outside {}-{:02}", day.staff_id, day.date, year, month),
                    Some(day.date),
                );
                continue;
            }
            if !seen.insert(day.date) {
                warn!(staff_id = %day.staff_id, date = %day.date, "Duplicate attendance row");
                trace.warn(
                    WARN_DUPLICATE_RECORD,
                    format!("More than one attendance row on {}; the first was used", day.date),
                    Some(day.date),
                );
                continue;
            }
            records.push(day);
        }

        let mut grants = Vec::with_capacity(self.leave_grants.len());
        for grant in &self.leave_grants {
            if grant.staff_id != self.profile.staff_id {
                warn!(staff_id = %grant.staff_id, grant_id = %grant.id, "Ignoring leave grant for another staff member");
                trace.warn(
                    WARN_RECORD_IGNORED,
                    format!(
                        "Leave grant for '{}' starting {} does not belong to '{}'",
                        grant.staff_id, grant.dates.start, self.profile.staff_id
                    ),
                    Some(grant.dates.start),
                );
                continue;
            }
            grants.push(grant.clone());
        }

        trace.push_step(
            "working_days",
            "Business Days in Month",
            serde_json::json!({
                "year": year,
                "month": month,
                "calendar_days": period.days(),
            }),
            serde_json::json!({ "working_days": working_days }),
            format!(
                "{} of {} days in {}-{:02} are business days",
                working_days,
                period.days(),
                year,
                month
            ),
        );

        Ok(MonthFrame {
            period,
            working_days,
            records,
            grants,
            trace,
        })
    }

    /// Buckets every business day of the month.
    pub(super) fn business_days(
        &self,
        frame: &MonthFrame<'_>,
        calendar: &CalendarService,
    ) -> Vec<(NaiveDate, DayBucket)> {
        let on_leave = leave_dates(&frame.grants, &frame.period);
        let by_date: BTreeMap<NaiveDate, AttendanceStatus> =
            frame.records.iter().map(|r| (r.date, r.status)).collect();
        let department = self.profile.department.as_deref();

        frame
            .period
            .iter_days()
            .filter(|d| calendar.is_business_day(*d))
            .map(|date| {
                let bucket = DayBucket::of(
                    by_date.get(&date).copied(),
                    on_leave.contains(&date),
                    calendar.is_holiday(date, department),
                );
                (date, bucket)
            })
            .collect()
    }

    /// Tallies every business day of the month into exactly one bucket.
    ///
    /// A business day with no record, no approved leave and no department
    /// holiday is an imputed absence.
    pub(super) fn tally_days(
        &self,
        frame: &mut MonthFrame<'_>,
        calendar: &CalendarService,
    ) -> DayCounts {
        let mut counts = DayCounts {
            working_days: frame.working_days,
            ..DayCounts::default()
        };

        for (_, bucket) in self.business_days(frame, calendar) {
            match bucket {
                DayBucket::Attended | DayBucket::PaidHoliday => counts.present_days += 1,
                DayBucket::Leave => counts.leave_days += 1,
                DayBucket::OnDuty => counts.on_duty_days += 1,
                DayBucket::Absent => counts.absent_days += 1,
                DayBucket::ImputedAbsent => {
                    counts.absent_days += 1;
                    counts.imputed_absent_days += 1;
                }
            }
        }

        debug!(
            present = counts.present_days,
            absent = counts.absent_days,
            leave = counts.leave_days,
            on_duty = counts.on_duty_days,
            "Day tally"
        );

        frame.trace.push_step(
            "day_tally",
            "Business Day Tally",
            serde_json::json!({
                "records": frame.records.len(),
                "leave_grants": frame.grants.len(),
            }),
            serde_json::json!({
                "present_days": counts.present_days,
                "absent_days": counts.absent_days,
                "imputed_absent_days": counts.imputed_absent_days,
                "leave_days": counts.leave_days,
                "on_duty_days": counts.on_duty_days,
            }),
            format!(
                "{} business days: {} present, {} absent ({} without any record), {} leave, {} on duty",
                counts.working_days,
                counts.present_days,
                counts.absent_days,
                counts.imputed_absent_days,
                counts.leave_days,
                counts.on_duty_days
            ),
        );

        counts
    }

    /// Sums late, early and overtime figures over attended records and prices them.
    ///
    /// Early arrival is measured from the record's stored check-in against the
    /// shift it was classified on, or the current `general` shift when the
    /// record has none. A check-in that cannot be parsed earns no bonus.
    pub(super) fn scan_adjustments(
        &self,
        frame: &mut MonthFrame<'_>,
        hourly_rate: Decimal,
    ) -> Adjustments {
        let mut adj = Adjustments::default();

        for record in frame.records.iter().filter(|r| r.status.is_attended()) {
            adj.late_minutes += record.late_minutes;
            adj.early_departure_minutes += record.early_minutes;
            adj.overtime_hours += record.overtime_hours;

            let shift = record.shift.as_ref().unwrap_or(&self.general_shift);
            match record.parsed_time_in() {
                Ok(Some(check_in)) => {
                    adj.early_arrival_minutes += early_arrival_minutes(shift, check_in);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "Skipping early-arrival bonus for unreadable check-in");
                    frame
                        .trace
                        .warn(WARN_DATA_INCONSISTENCY, e.to_string(), Some(record.date));
                }
            }
        }

        let rules = &self.rules;
        adj.early_arrival_bonus = round_money(
            minutes_to_hours(adj.early_arrival_minutes)
                * rules.get(RuleKey::EarlyArrivalBonusPerHour),
        );
        adj.early_departure_penalty = round_money(
            minutes_to_hours(adj.early_departure_minutes)
                * rules.get(RuleKey::EarlyDeparturePenaltyPerHour),
        );
        adj.late_arrival_penalty = round_money(
            minutes_to_hours(adj.late_minutes) * rules.get(RuleKey::LateArrivalPenaltyPerHour),
        );
        adj.overtime_pay = round_money(
            adj.overtime_hours * hourly_rate * rules.get(RuleKey::OvertimeMultiplier),
        );

        frame.trace.push_step(
            "attendance_adjustments",
            "Early, Late and Overtime Adjustments",
            serde_json::json!({
                "early_arrival_minutes": adj.early_arrival_minutes,
                "early_departure_minutes": adj.early_departure_minutes,
                "late_minutes": adj.late_minutes,
                "overtime_hours": money_json(adj.overtime_hours),
                "hourly_rate": money_json(round_money(hourly_rate)),
            }),
            serde_json::json!({
                "early_arrival_bonus": money_json(adj.early_arrival_bonus),
                "early_departure_penalty": money_json(adj.early_departure_penalty),
                "late_arrival_penalty": money_json(adj.late_arrival_penalty),
                "overtime_pay": money_json(adj.overtime_pay),
            }),
            "Minutes are priced per hour at the configured rates; overtime at the hourly rate times the multiplier".to_string(),
        );

        adj
    }

    /// Leave days and pay for the month at `per_day_pay`.
    pub(super) fn leave_impact(
        &self,
        frame: &mut MonthFrame<'_>,
        per_day_pay: Decimal,
    ) -> EngineResult<LeaveImpact> {
        let impact = LeavePolicy::new(self.rules.clone()).monthly_leave_impact(
            &frame.grants,
            self.year,
            self.month,
            per_day_pay,
        )?;

        let by_type: BTreeMap<&str, u32> =
            impact.by_type.iter().map(|(t, d)| (t.code(), *d)).collect();
        frame.trace.push_step(
            "leave_pay",
            "Leave Pay",
            serde_json::json!({
                "grants": frame.grants.len(),
                "per_day_pay": money_json(round_money(per_day_pay)),
            }),
            serde_json::json!({
                "total_leave_days": impact.total_leave_days,
                "days_by_type": by_type,
                "leave_pay": money_json(impact.leave_pay),
            }),
            format!(
                "{} approved leave days fall in the month",
                impact.total_leave_days
            ),
        );

        Ok(impact)
    }

    /// Computes the day-based breakdown from already-fetched inputs.
    ///
    /// `per_day_salary` is the gross salary (basic plus allowances) over the
    /// month's business days and the hourly rate is a day's pay over eight
    /// hours. The allowances are also paid as fixed earnings.
    pub fn compute(&self, calendar: &CalendarService) -> EngineResult<SalaryBreakdown> {
        let mut frame = self.frame(calendar)?;
        let gross = self.profile.basic_salary + self.profile.allowances_total();
        let per_day = gross / Decimal::from(frame.working_days);
        let per_hour = per_day / Decimal::from(DAY_BASED_HOURS_PER_DAY);

        frame.trace.push_step(
            "per_day_rate",
            "Per-Day and Per-Hour Salary",
            serde_json::json!({
                "basic_salary": money_json(self.profile.basic_salary),
                "gross_salary": money_json(gross),
                "working_days": frame.working_days,
            }),
            serde_json::json!({
                "per_day_salary": money_json(round_money(per_day)),
                "per_hour_salary": money_json(round_money(per_hour)),
            }),
            format!(
                "Gross salary over {} business days; hourly rate over {} hours",
                frame.working_days, DAY_BASED_HOURS_PER_DAY
            ),
        );

        let days = self.tally_days(&mut frame, calendar);
        let adjustments = self.scan_adjustments(&mut frame, per_hour);
        let leave = self.leave_impact(&mut frame, per_day)?;

        let basic_earned = round_money(Decimal::from(days.present_days) * per_day);
        let on_duty_pay = round_money(
            Decimal::from(days.on_duty_days) * per_day * self.rules.get(RuleKey::OnDutyPayRate),
        );
        let absent_deduction = round_money(
            Decimal::from(days.absent_days)
                * per_day
                * self.rules.get(RuleKey::AbsentDeductionRate),
        );

        let parts = BreakdownParts {
            mode: ComputationMode::DayBased,
            per_day_salary: per_day,
            per_hour_salary: per_hour,
            days,
            basic_earned,
            on_duty_pay,
            extra_hours_bonus: Decimal::ZERO,
            absent_deduction,
            leave,
            adjustments,
            hours: None,
        };
        Ok(parts.finish(self, frame))
    }
}

impl BreakdownParts {
    /// Adds allowances and statutory deductions and totals the breakdown.
    pub(super) fn finish(self, inputs: &MonthlyInputs, mut frame: MonthFrame<'_>) -> SalaryBreakdown {
        let profile = &inputs.profile;
        let adj = self.adjustments;

        let mut earnings = Earnings {
            basic_earned: self.basic_earned,
            on_duty_pay: self.on_duty_pay,
            leave_pay: self.leave.leave_pay,
            early_arrival_bonus: adj.early_arrival_bonus,
            overtime_pay: adj.overtime_pay,
            extra_hours_bonus: self.extra_hours_bonus,
            hra: round_money(profile.hra),
            transport_allowance: round_money(profile.transport_allowance),
            other_allowances: round_money(profile.other_allowances),
            total: Decimal::ZERO,
        };
        earnings.total = earnings.basic_earned
            + earnings.on_duty_pay
            + earnings.leave_pay
            + earnings.early_arrival_bonus
            + earnings.overtime_pay
            + earnings.extra_hours_bonus
            + earnings.hra
            + earnings.transport_allowance
            + earnings.other_allowances;

        let mut deductions = Deductions {
            absent_deduction: self.absent_deduction,
            early_departure_penalty: adj.early_departure_penalty,
            late_arrival_penalty: adj.late_arrival_penalty,
            pf: round_money(profile.pf_deduction),
            esi: round_money(profile.esi_deduction),
            professional_tax: round_money(profile.professional_tax),
            other: round_money(profile.other_deductions),
            total: Decimal::ZERO,
        };
        deductions.total = deductions.absent_deduction
            + deductions.early_departure_penalty
            + deductions.late_arrival_penalty
            + deductions.pf
            + deductions.esi
            + deductions.professional_tax
            + deductions.other;

        let net_salary = earnings.total - deductions.total;

        frame.trace.push_step(
            "net_salary",
            "Net Salary",
            serde_json::json!({
                "earnings_total": money_json(earnings.total),
                "deductions_total": money_json(deductions.total),
                "statutory_deductions":
                    money_json(round_money(profile.statutory_deductions_total())),
            }),
            serde_json::json!({ "net_salary": money_json(net_salary) }),
            "Net salary is total earnings less total deductions".to_string(),
        );

        info!(
            staff_id = %profile.staff_id,
            year = inputs.year,
            month = inputs.month,
            mode = ?self.mode,
            net_salary = %net_salary,
            warnings = frame.trace.warnings.len(),
            "Salary computed"
        );

        SalaryBreakdown {
            staff_id: profile.staff_id.clone(),
            year: inputs.year,
            month: inputs.month,
            mode: self.mode,
            per_day_salary: round_money(self.per_day_salary),
            per_hour_salary: round_money(self.per_hour_salary),
            days: self.days,
            paid_leave_days: self.leave.total_leave_days,
            late_minutes: adj.late_minutes,
            early_departure_minutes: adj.early_departure_minutes,
            early_arrival_minutes: adj.early_arrival_minutes,
            overtime_hours: round_hours(adj.overtime_hours),
            earnings,
            deductions,
            net_salary,
            hours: self.hours,
            audit_trace: frame.trace,
        }
    }
}

/// Computes monthly salary breakdowns from stored records.
///
/// Every call fetches fresh records, rules and institution timing, so changes
/// made between calls are always reflected.
///
/// # Example
///
/// ```
/// use attendance_payroll::calculation::{CalendarService, InMemoryPayrollRecords, SalaryComputer};
/// use attendance_payroll::config::InstitutionTiming;
/// use attendance_payroll::models::StaffPayProfile;
/// use attendance_payroll::rules::{InMemoryRuleRepository, SalaryRuleStore};
/// use rust_decimal::Decimal;
///
/// let mut records = InMemoryPayrollRecords::new();
/// records.add_profile(StaffPayProfile::with_basic("T-001", Decimal::from(26000)));
/// let repo = InMemoryRuleRepository::new();
/// let rules = SalaryRuleStore::new(&repo, Some(1));
/// let calendar = CalendarService::default();
/// let timing = InstitutionTiming::default();
///
/// let computer = SalaryComputer::new(&records, &rules, &calendar, &timing);
/// let breakdown = computer.compute("T-001", 2024, 3).unwrap();
///
/// // no attendance at all: every business day is an imputed absence
/// assert_eq!(breakdown.days.working_days, 26);
/// assert_eq!(breakdown.days.imputed_absent_days, 26);
/// ```
pub struct SalaryComputer<'a> {
    records: &'a dyn PayrollRecords,
    rules: &'a SalaryRuleStore<'a>,
    calendar: &'a CalendarService,
    timing: &'a dyn TimingSource,
}

impl<'a> SalaryComputer<'a> {
    /// Creates a computer over the given collaborators.
    pub fn new(
        records: &'a dyn PayrollRecords,
        rules: &'a SalaryRuleStore<'a>,
        calendar: &'a CalendarService,
        timing: &'a dyn TimingSource,
    ) -> Self {
        Self {
            records,
            rules,
            calendar,
            timing,
        }
    }

    /// Fetches everything a computation for `staff_id` and the month needs.
    pub fn gather(&self, staff_id: &str, year: i32, month: u32) -> EngineResult<MonthlyInputs> {
        let period =
            DateRange::month(year, month).ok_or(EngineError::InvalidPeriod { year, month })?;
        let profile = self.records.pay_profile(staff_id)?;
        let attendance = self.records.attendance(staff_id, year, month)?;
        let leave_grants = self.records.leave_grants(staff_id, &period)?;
        let rules = self.rules.snapshot()?;
        let general_shift = live_general_shift(self.timing)?;

        debug!(
            staff_id,
            year,
            month,
            attendance_rows = attendance.len(),
            leave_grants = leave_grants.len(),
            "Gathered payroll inputs"
        );

        Ok(MonthlyInputs {
            year,
            month,
            profile,
            attendance,
            leave_grants,
            rules,
            general_shift,
        })
    }

    /// Day-based computation: pay pro-rated by day counts.
    pub fn compute(&self, staff_id: &str, year: i32, month: u32) -> EngineResult<SalaryBreakdown> {
        self.gather(staff_id, year, month)?.compute(self.calendar)
    }

    /// Hours-based computation: pay pro-rated by actual over standard hours.
    pub fn compute_enhanced(
        &self,
        staff_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<SalaryBreakdown> {
        self.gather(staff_id, year, month)?
            .compute_enhanced(self.calendar)
    }
}
