//! Hours-based salary computation.
//!
//! Pay is pro-rated by the ratio of hours actually credited to the standard
//! hours of the month, with a bonus for surplus hours above a threshold.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceStatus, ComputationMode, HoursSummary, SalaryBreakdown};
use crate::rules::{RuleKey, RuleSnapshot};

use super::CalendarService;
use super::salary::{
    BreakdownParts, DayBucket, MonthFrame, MonthlyInputs, WARN_DATA_INCONSISTENCY,
    WARN_INCOMPLETE_PUNCH,
};
use super::time_math::{round_hours, round_money, span_hours};

/// Bonus for `extra_hours` beyond the standard month.
///
/// Nothing is paid unless the surplus reaches the configured minimum.
pub fn extra_hours_bonus(extra_hours: Decimal, hourly_rate: Decimal, rules: &RuleSnapshot) -> Decimal {
    let minimum = rules.get(RuleKey::MinimumHoursForBonus);
    if extra_hours <= Decimal::ZERO || extra_hours < minimum {
        return Decimal::ZERO;
    }
    round_money(
        extra_hours * hourly_rate * rules.get(RuleKey::BonusRatePercentage) / Decimal::from(100),
    )
}

impl MonthlyInputs {
    /// Hours credited for the month.
    ///
    /// Attended days use the recorded work hours, else the span between the
    /// punches; on-duty days count as a standard day. A day whose punches
    /// cannot be read is credited a standard day, and a day missing a punch
    /// is credited nothing, each with a warning. Business days paid as
    /// holidays count as a standard day.
    fn hours_worked(
        &self,
        frame: &mut MonthFrame<'_>,
        calendar: &CalendarService,
        standard_daily_hours: Decimal,
    ) -> Decimal {
        let paid_holidays = self
            .business_days(frame, calendar)
            .into_iter()
            .filter(|(_, bucket)| *bucket == DayBucket::PaidHoliday)
            .count();
        let mut total = standard_daily_hours * Decimal::from(paid_holidays);

        for record in &frame.records {
            let hours = match record.status {
                AttendanceStatus::OnDuty => standard_daily_hours,
                status if status.is_attended() => match record.work_hours {
                    Some(hours) => hours,
                    None => match (record.parsed_time_in(), record.parsed_time_out()) {
                        (Ok(Some(check_in)), Ok(Some(check_out))) => span_hours(check_in, check_out),
                        (Err(e), _) | (_, Err(e)) => {
                            warn!(error = %e, "Crediting standard hours for unreadable punch");
                            frame.trace.warn(
                                WARN_DATA_INCONSISTENCY,
                                format!("{}; credited {} standard hours", e, standard_daily_hours.normalize()),
                                Some(record.date),
                            );
                            standard_daily_hours
                        }
                        _ => {
                            frame.trace.warn(
                                WARN_INCOMPLETE_PUNCH,
                                format!("Attended day on {} is missing a punch; no hours credited", record.date),
                                Some(record.date),
                            );
                            Decimal::ZERO
                        }
                    },
                },
                _ => Decimal::ZERO,
            };
            total += hours;
        }

        total
    }

    /// Computes the hours-based breakdown from already-fetched inputs.
    ///
    /// Requires a positive basic salary. The standard month is the `general`
    /// shift length times the business days; the hourly rate replaces the
    /// day-based hourly rate for overtime and minute adjustments. There is no
    /// absent deduction since missing hours already reduce pay.
    pub fn compute_enhanced(&self, calendar: &CalendarService) -> EngineResult<SalaryBreakdown> {
        let basic = self.profile.basic_salary;
        if basic <= Decimal::ZERO {
            return Err(EngineError::BaseSalaryNotConfigured {
                staff_id: self.profile.staff_id.clone(),
            });
        }

        let mut frame = self.frame(calendar)?;
        let working_days = Decimal::from(frame.working_days);
        let standard_daily = self.general_shift.duration_hours();
        let standard_monthly = standard_daily * working_days;
        if standard_monthly <= Decimal::ZERO {
            warn!(
                staff_id = %self.profile.staff_id,
                shift_type = %self.general_shift.shift_type,
                "General shift has no duration"
            );
            return Err(EngineError::InvalidShiftWindow {
                shift_type: self.general_shift.shift_type.clone(),
                message: "the shift has no duration to pro-rate against".to_string(),
            });
        }
        let hourly_rate = basic / standard_monthly;

        frame.trace.push_step(
            "standard_hours",
            "Standard Monthly Hours",
            serde_json::json!({
                "shift_start": self.general_shift.start.to_string(),
                "shift_end": self.general_shift.end.to_string(),
                "working_days": frame.working_days,
                "basic_salary": basic.normalize().to_string(),
            }),
            serde_json::json!({
                "standard_daily_hours": standard_daily.normalize().to_string(),
                "standard_monthly_hours": standard_monthly.normalize().to_string(),
                "hourly_rate": round_money(hourly_rate).normalize().to_string(),
            }),
            format!(
                "{} hours per day over {} business days",
                standard_daily.normalize(),
                frame.working_days
            ),
        );

        let actual = self.hours_worked(&mut frame, calendar, standard_daily);
        let ratio = actual / standard_monthly;
        let basic_earned = round_money(basic * ratio);
        let extra = (actual - standard_monthly).max(Decimal::ZERO);
        let bonus = extra_hours_bonus(extra, hourly_rate, &self.rules);

        debug!(%actual, %ratio, %extra, %bonus, "Hours ratio");

        frame.trace.push_step(
            "hours_ratio",
            "Hours Ratio Pay",
            serde_json::json!({
                "actual_hours_worked": round_hours(actual).normalize().to_string(),
                "standard_monthly_hours": standard_monthly.normalize().to_string(),
                "minimum_hours_for_bonus": self.rules.get(RuleKey::MinimumHoursForBonus).normalize().to_string(),
                "bonus_rate_percentage": self.rules.get(RuleKey::BonusRatePercentage).normalize().to_string(),
            }),
            serde_json::json!({
                "hours_ratio": round_ratio(ratio).normalize().to_string(),
                "basic_earned": basic_earned.normalize().to_string(),
                "extra_hours_worked": round_hours(extra).normalize().to_string(),
                "bonus_for_extra_hours": bonus.normalize().to_string(),
            }),
            if bonus > Decimal::ZERO {
                "Basic salary scaled by the hours ratio; extra hours reached the bonus threshold".to_string()
            } else {
                "Basic salary scaled by the hours ratio; no extra-hours bonus".to_string()
            },
        );

        let days = self.tally_days(&mut frame, calendar);
        let adjustments = self.scan_adjustments(&mut frame, hourly_rate);
        let per_day = basic / working_days;
        let leave = self.leave_impact(&mut frame, per_day)?;

        let hours = HoursSummary {
            standard_daily_hours: round_hours(standard_daily),
            standard_monthly_hours: round_hours(standard_monthly),
            actual_hours_worked: round_hours(actual),
            hours_ratio: round_ratio(ratio),
            extra_hours_worked: round_hours(extra),
            bonus_for_extra_hours: bonus,
        };

        let parts = BreakdownParts {
            mode: ComputationMode::HoursBased,
            per_day_salary: per_day,
            per_hour_salary: hourly_rate,
            days,
            basic_earned,
            on_duty_pay: Decimal::ZERO,
            extra_hours_bonus: bonus,
            absent_deduction: Decimal::ZERO,
            leave,
            adjustments,
            hours: Some(hours),
        };
        Ok(parts.finish(self, frame))
    }
}

fn round_ratio(ratio: Decimal) -> Decimal {
    ratio.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use std::str::FromStr;

    use crate::models::{
        AttendanceDay, DateRange, Holiday, LeaveGrant, LeaveType, ShiftWindow, StaffPayProfile,
    };

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn business_days() -> Vec<u32> {
        (1..=31)
            .filter(|d| ![3, 10, 17, 24, 31].contains(d))
            .collect()
    }

    fn worked(d: u32, hours: &str) -> AttendanceDay {
        let mut day = AttendanceDay::with_status("T-001", date(d), AttendanceStatus::Present);
        day.work_hours = Some(dec(hours));
        day
    }

    /// 09:00-17:00 over March 2024's 26 business days: 208 standard hours,
    /// so a basic of 20800 gives an hourly rate of 100.
    fn inputs(attendance: Vec<AttendanceDay>) -> MonthlyInputs {
        MonthlyInputs {
            year: 2024,
            month: 3,
            profile: StaffPayProfile::with_basic("T-001", dec("20800")),
            attendance,
            leave_grants: vec![],
            rules: RuleSnapshot::defaults(),
            general_shift: ShiftWindow::new(
                "general",
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            )
            .unwrap(),
        }
    }

    fn standard_month_with_last_day(hours: &str) -> Vec<AttendanceDay> {
        let days = business_days();
        let last = *days.last().unwrap();
        days.into_iter()
            .map(|d| if d == last { worked(d, hours) } else { worked(d, "8") })
            .collect()
    }

    /// HB-006: a general shift shorter than a minute still has a standard month
    #[test]
    fn test_sub_minute_general_shift() {
        let mut inputs = inputs(standard_month_with_last_day("8"));
        inputs.general_shift = ShiftWindow::new(
            "general",
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 30).unwrap(),
        )
        .unwrap();

        let breakdown = inputs.compute_enhanced(&CalendarService::default()).unwrap();
        let hours = breakdown.hours.as_ref().unwrap();
        assert!(hours.standard_monthly_hours > Decimal::ZERO);
        assert!(breakdown.per_hour_salary > Decimal::ZERO);
    }

    /// HB-007: a zero-length window that skipped validation is an error
    #[test]
    fn test_zero_length_general_shift_is_rejected() {
        let mut inputs = inputs(standard_month_with_last_day("8"));
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        inputs.general_shift = ShiftWindow {
            shift_type: "general".to_string(),
            start: nine,
            end: nine,
        };

        let result = inputs.compute_enhanced(&CalendarService::default());
        match result {
            Err(e @ EngineError::InvalidShiftWindow { .. }) => {
                assert_eq!(e.kind(), crate::error::ErrorKind::Configuration);
            }
            other => panic!("Expected InvalidShiftWindow, got {:?}", other),
        }
    }

    /// HB-001: standard month earns exactly the basic salary
    #[test]
    fn test_standard_month() {
        let breakdown = inputs(standard_month_with_last_day("8"))
            .compute_enhanced(&CalendarService::default())
            .unwrap();
        let hours = breakdown.hours.as_ref().unwrap();

        assert_eq!(breakdown.mode, ComputationMode::HoursBased);
        assert_eq!(hours.standard_monthly_hours, dec("208"));
        assert_eq!(hours.actual_hours_worked, dec("208"));
        assert_eq!(hours.hours_ratio, dec("1"));
        assert_eq!(breakdown.per_hour_salary, dec("100.00"));
        assert_eq!(breakdown.earnings.basic_earned, dec("20800.00"));
        assert_eq!(breakdown.net_salary, dec("20800.00"));
    }

    /// HB-002: under-work reduces pay proportionally
    #[test]
    fn test_under_work_is_pro_rated() {
        let attendance = business_days()
            .into_iter()
            .take(13)
            .map(|d| worked(d, "8"))
            .collect();
        let breakdown = inputs(attendance)
            .compute_enhanced(&CalendarService::default())
            .unwrap();

        assert_eq!(breakdown.hours.as_ref().unwrap().hours_ratio, dec("0.5"));
        assert_eq!(breakdown.earnings.basic_earned, dec("10400.00"));
        assert_eq!(breakdown.deductions.absent_deduction, Decimal::ZERO);
        assert_eq!(breakdown.days.imputed_absent_days, 13);
    }

    /// HB-003: extra hours just below the threshold earn no bonus
    #[test]
    fn test_bonus_below_threshold() {
        let breakdown = inputs(standard_month_with_last_day("12.9"))
            .compute_enhanced(&CalendarService::default())
            .unwrap();
        let hours = breakdown.hours.as_ref().unwrap();

        assert_eq!(hours.extra_hours_worked, dec("4.9"));
        assert_eq!(hours.bonus_for_extra_hours, Decimal::ZERO);
        assert_eq!(breakdown.earnings.extra_hours_bonus, Decimal::ZERO);
    }

    /// HB-004: extra hours at the threshold earn the bonus
    #[test]
    fn test_bonus_at_threshold() {
        let breakdown = inputs(standard_month_with_last_day("13"))
            .compute_enhanced(&CalendarService::default())
            .unwrap();
        let hours = breakdown.hours.as_ref().unwrap();

        assert_eq!(hours.extra_hours_worked, dec("5"));
        // 5 h x 100/h x 50%
        assert_eq!(hours.bonus_for_extra_hours, dec("250.00"));
        assert_eq!(breakdown.earnings.basic_earned, dec("21300.00"));
        assert_eq!(breakdown.earnings.total, dec("21550.00"));
    }

    /// HB-005: basic salary must be positive
    #[test]
    fn test_missing_basic_salary() {
        let mut inputs = inputs(vec![]);
        inputs.profile.basic_salary = Decimal::ZERO;
        match inputs.compute_enhanced(&CalendarService::default()) {
            Err(EngineError::BaseSalaryNotConfigured { staff_id }) => assert_eq!(staff_id, "T-001"),
            other => panic!("Expected BaseSalaryNotConfigured, got {:?}", other),
        }
    }

    #[test]
    fn test_on_duty_counts_standard_day() {
        let mut attendance = standard_month_with_last_day("8");
        attendance[0] = AttendanceDay::with_status("T-001", date(1), AttendanceStatus::OnDuty);

        let breakdown = inputs(attendance)
            .compute_enhanced(&CalendarService::default())
            .unwrap();
        assert_eq!(breakdown.hours.as_ref().unwrap().actual_hours_worked, dec("208"));
        assert_eq!(breakdown.earnings.on_duty_pay, Decimal::ZERO);
    }

    #[test]
    fn test_department_holiday_credits_standard_day() {
        let mut attendance = standard_month_with_last_day("8");
        attendance.retain(|r| r.date != date(14));
        let mut inputs = inputs(attendance);
        inputs.profile.department = Some("science".to_string());
        let calendar = CalendarService::new(vec![Holiday::for_departments(
            1,
            "Lab audit",
            DateRange::single(date(14)),
            ["science"],
        )]);

        let breakdown = inputs.compute_enhanced(&calendar).unwrap();
        assert_eq!(breakdown.hours.as_ref().unwrap().actual_hours_worked, dec("208"));
        assert_eq!(breakdown.days.present_days, 26);
    }

    #[test]
    fn test_hours_from_punches_with_overnight_span() {
        let mut attendance = standard_month_with_last_day("8");
        let mut overnight = AttendanceDay::with_status("T-001", date(1), AttendanceStatus::Present);
        overnight.time_in = Some("22:00:00".to_string());
        overnight.time_out = Some("06:00:00".to_string());
        attendance[0] = overnight;

        let breakdown = inputs(attendance)
            .compute_enhanced(&CalendarService::default())
            .unwrap();
        assert_eq!(breakdown.hours.as_ref().unwrap().actual_hours_worked, dec("208"));
        assert!(breakdown.audit_trace.warnings.is_empty());
    }

    #[test]
    fn test_unreadable_punch_credits_standard_day() {
        let mut attendance = standard_month_with_last_day("8");
        let mut corrupt = AttendanceDay::with_status("T-001", date(1), AttendanceStatus::Late);
        corrupt.time_in = Some("10:00:00".to_string());
        corrupt.time_out = Some("half past four".to_string());
        attendance[0] = corrupt;

        let breakdown = inputs(attendance)
            .compute_enhanced(&CalendarService::default())
            .unwrap();
        assert_eq!(breakdown.hours.as_ref().unwrap().actual_hours_worked, dec("208"));
        assert_eq!(breakdown.audit_trace.warnings.len(), 1);
        assert_eq!(breakdown.audit_trace.warnings[0].code, WARN_DATA_INCONSISTENCY);
        assert_eq!(breakdown.audit_trace.warnings[0].date, Some(date(1)));
    }

    #[test]
    fn test_missing_punch_credits_nothing() {
        let mut attendance = standard_month_with_last_day("8");
        let mut open = AttendanceDay::with_status("T-001", date(1), AttendanceStatus::Present);
        open.time_in = Some("09:00:00".to_string());
        attendance[0] = open;

        let breakdown = inputs(attendance)
            .compute_enhanced(&CalendarService::default())
            .unwrap();
        assert_eq!(breakdown.hours.as_ref().unwrap().actual_hours_worked, dec("200"));
        assert_eq!(breakdown.audit_trace.warnings[0].code, WARN_INCOMPLETE_PUNCH);
    }

    #[test]
    fn test_overtime_uses_hourly_rate() {
        let mut attendance = standard_month_with_last_day("8");
        attendance[0].overtime_hours = dec("2");

        let breakdown = inputs(attendance)
            .compute_enhanced(&CalendarService::default())
            .unwrap();
        // 2 h x 100/h x 1.5
        assert_eq!(breakdown.earnings.overtime_pay, dec("300.00"));
    }

    #[test]
    fn test_leave_pay_uses_per_day_salary() {
        let mut inputs = inputs(standard_month_with_last_day("8"));
        inputs.leave_grants = vec![LeaveGrant::approved(
            "T-001",
            LeaveType::Earned,
            DateRange::single(date(3)),
        )];

        let breakdown = inputs.compute_enhanced(&CalendarService::default()).unwrap();
        assert_eq!(breakdown.earnings.leave_pay, dec("800.00"));
        assert_eq!(breakdown.paid_leave_days, 1);
    }

    #[test]
    fn test_repeated_computation_is_identical() {
        let inputs = inputs(standard_month_with_last_day("13"));
        let calendar = CalendarService::default();

        let first = serde_json::to_string(&inputs.compute_enhanced(&calendar).unwrap()).unwrap();
        let second = serde_json::to_string(&inputs.compute_enhanced(&calendar).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_extra_hours_bonus_threshold() {
        let rules = RuleSnapshot::defaults();
        assert_eq!(extra_hours_bonus(dec("4.9"), dec("100"), &rules), Decimal::ZERO);
        assert!(extra_hours_bonus(dec("5.0"), dec("100"), &rules) > Decimal::ZERO);
        assert_eq!(extra_hours_bonus(Decimal::ZERO, dec("100"), &rules.with(RuleKey::MinimumHoursForBonus, Decimal::ZERO)), Decimal::ZERO);
    }
}
