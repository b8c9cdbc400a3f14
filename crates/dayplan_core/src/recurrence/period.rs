//! Calendar period arithmetic.
//!
//! All helpers return `None` instead of panicking when the result would fall
//! outside chrono's representable range; expansion treats that as a stop.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};

use crate::model::item::Repeat;

/// Advances `instant` by one period of `repeat`. `Repeat::None` never advances.
pub fn advance_instant(instant: DateTime<Utc>, repeat: Repeat) -> Option<DateTime<Utc>> {
    let next_date = advance_date(instant.date_naive(), repeat)?;
    Some(next_date.and_time(instant.time()).and_utc())
}

/// Advances `date` by one period of `repeat`. `Repeat::None` never advances.
pub fn advance_date(date: NaiveDate, repeat: Repeat) -> Option<NaiveDate> {
    match repeat {
        Repeat::None => None,
        Repeat::Daily => date.checked_add_days(Days::new(1)),
        Repeat::Weekly => date.checked_add_days(Days::new(7)),
        Repeat::Monthly => add_one_month(date),
    }
}

/// Same day next month, clamped to the target month's last day.
///
/// Clamping only looks at `date`, so repeated application drifts:
/// Jan 31 -> Feb 28 -> Mar 28.
pub fn add_one_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year().checked_add(1)?, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Number of days in `month` of `year`, leap years included.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|last| last.day())
}
