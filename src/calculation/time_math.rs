//! Time-window arithmetic shared by classification and salary computation.
//!
//! Times are placed on a timeline starting at the shift start. For windows
//! that wrap past midnight, times up to the shift end are read as belonging
//! to the following day. A time in the daytime gap between end and start
//! belongs to whichever edge is nearer, so a morning check-in after a night
//! shift ended is late rather than many hours early.

use chrono::NaiveTime;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::ShiftWindow;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Seconds from the shift start to `time`. Negative when `time` is before the shift.
pub fn offset_from_start(shift: &ShiftWindow, time: NaiveTime) -> i64 {
    let raw = (time - shift.start).num_seconds();
    // at or before the end, `since_end` is never positive, so this also
    // covers the after-midnight part of the window
    let since_end = (time - shift.end).num_seconds();
    if shift.wraps_midnight() && time < shift.start && since_end < -raw {
        raw + SECONDS_PER_DAY
    } else {
        raw
    }
}

fn ceil_minutes(seconds: i64) -> u32 {
    if seconds <= 0 {
        0
    } else {
        ((seconds + 59) / 60) as u32
    }
}

/// Minutes after the shift start, rounded up so any lateness counts.
///
/// Arriving exactly at the start is on time.
pub fn late_minutes(shift: &ShiftWindow, check_in: NaiveTime) -> u32 {
    ceil_minutes(offset_from_start(shift, check_in))
}

/// Minutes before the shift start.
pub fn early_arrival_minutes(shift: &ShiftWindow, check_in: NaiveTime) -> u32 {
    ceil_minutes(-offset_from_start(shift, check_in))
}

/// Minutes between the check-out and the shift end.
///
/// A check-out earlier on the clock than the check-in is read as the next
/// day, so overnight stays never count as leaving early.
pub fn early_departure_minutes(
    shift: &ShiftWindow,
    check_in: NaiveTime,
    check_out: NaiveTime,
) -> u32 {
    let in_offset = offset_from_start(shift, check_in);
    let mut out_offset = offset_from_start(shift, check_out);
    if out_offset < in_offset {
        out_offset += SECONDS_PER_DAY;
    }
    let end_offset = shift.duration_seconds();
    ceil_minutes(end_offset - out_offset)
}

/// Hours from `from` to `to`, adding a day when `to` is earlier on the clock.
pub fn span_hours(from: NaiveTime, to: NaiveTime) -> Decimal {
    let mut seconds = (to - from).num_seconds();
    if seconds < 0 {
        seconds += SECONDS_PER_DAY;
    }
    Decimal::from(seconds) / Decimal::from(3600)
}

/// Converts minutes to hours.
pub fn minutes_to_hours(minutes: u32) -> Decimal {
    Decimal::from(minutes) / Decimal::from(60)
}

/// Rounds a monetary amount to 2 decimal places, midpoint away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds an hours figure to 2 decimal places.
pub fn round_hours(hours: Decimal) -> Decimal {
    hours.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
