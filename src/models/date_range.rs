//! Inclusive date ranges.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An inclusive range of calendar dates.
///
/// Holidays and leave grants are both stored as ranges; a single-day
/// holiday has `start == end`.
///
/// # Example
///
/// ```
/// use attendance_payroll::models::DateRange;
/// use chrono::NaiveDate;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 1, 28).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
/// );
/// assert_eq!(range.days(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RangeBounds")]
pub struct DateRange {
    /// First date of the range (inclusive).
    pub start: NaiveDate,
    /// Last date of the range (inclusive).
    pub end: NaiveDate,
}

/// Stored bounds, checked before they become a [`DateRange`].
#[derive(Deserialize)]
struct RangeBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RangeBounds> for DateRange {
    type Error = String;

    fn try_from(bounds: RangeBounds) -> Result<Self, Self::Error> {
        if bounds.end < bounds.start {
            return Err(format!(
                "date range ends on {} before it starts on {}",
                bounds.end, bounds.start
            ));
        }
        Ok(Self {
            start: bounds.start,
            end: bounds.end,
        })
    }
}

impl DateRange {
    /// Creates a range, swapping the bounds if they were given in reverse.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// A range covering a single date.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// The full calendar month, or `None` if `month` is not 1-12.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self {
            start,
            end: next.pred_opt()?,
        })
    }

    /// Returns true if `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns the overlap with `other`, or `None` when they are disjoint.
    pub fn clip(&self, other: &DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(DateRange { start, end })
    }

    /// Number of days in the range, counting both ends.
    pub fn days(&self) -> u32 {
        u32::try_from((self.end - self.start).num_days() + 1).unwrap_or(0)
    }

    /// Iterates every date in the range in order.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}
