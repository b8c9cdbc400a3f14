//! Per-item occurrence expansion.
//!
//! # Invariants
//! - Event anchors are always emitted, regardless of the window.
//! - Habit dates are all window-filtered, the first one included.
//! - Each step derives from the previous occurrence, never from the anchor.

use chrono::{DateTime, Days, NaiveDate, Utc};
use log::debug;

use crate::model::item::{midnight_utc, RecurringItem, Repeat, Schedule};
use crate::model::occurrence::Occurrence;
use crate::recurrence::period::{advance_date, advance_instant};
use crate::recurrence::window::ViewWindow;

/// Upper bound on generated candidates per item (event anchors excluded).
///
/// Candidates skipped for falling before the window count too, so a far
/// window costs at most this many steps.
pub const MAX_GENERATED_OCCURRENCES: usize = 100;

/// Expands one item into its occurrences inside `window`.
///
/// Never fails. Items that violate the write-time invariants still terminate
/// and yield whatever was produced before a stop condition fired.
pub fn expand(item: &RecurringItem, window: &ViewWindow) -> Vec<Occurrence> {
    match item.schedule {
        Schedule::Event {
            start,
            end,
            repeat_until,
            ..
        } => expand_event(item, Span { start, end }, repeat_until, window),
        Schedule::Habit {
            start_date,
            end_date,
            ..
        } => expand_habit(item, start_date, end_date.unwrap_or(start_date), window),
    }
}

/// Start/end carried from one occurrence to the next.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
}

impl Span {
    fn advance(self, repeat: Repeat) -> Option<Self> {
        let start = advance_instant(self.start, repeat)?;
        let end = match self.end {
            Some(end) => Some(advance_instant(end, repeat)?),
            None => None,
        };
        Some(Self { start, end })
    }
}

fn expand_event(
    item: &RecurringItem,
    anchor: Span,
    repeat_until: Option<NaiveDate>,
    window: &ViewWindow,
) -> Vec<Occurrence> {
    let mut occurrences = vec![Occurrence::anchor(item)];
    let until = match repeat_until {
        Some(until) if item.repeat.is_repeating() => until,
        _ => return occurrences,
    };

    let mut current = anchor;
    let mut candidates = 0;
    while candidates < MAX_GENERATED_OCCURRENCES {
        current = match current.advance(item.repeat) {
            Some(next) => next,
            None => break,
        };
        candidates += 1;
        if current.start.date_naive() > until || window.is_past_end(current.start) {
            break;
        }
        if window.is_before_start(current.start) {
            continue;
        }
        occurrences.push(Occurrence::generated(item, current.start, current.end));
    }

    if candidates == MAX_GENERATED_OCCURRENCES {
        debug!(
            "event=expand module=recurrence status=capped kind=event item_id={} emitted={}",
            item.id,
            occurrences.len() - 1
        );
    }
    occurrences
}

fn expand_habit(
    item: &RecurringItem,
    start_date: NaiveDate,
    end_date: NaiveDate,
    window: &ViewWindow,
) -> Vec<Occurrence> {
    let mut occurrences = Vec::new();
    let mut current = start_date;
    let mut candidates = 0;

    while current <= end_date && candidates < MAX_GENERATED_OCCURRENCES {
        let start = midnight_utc(current);
        candidates += 1;
        if window.is_past_end(start) {
            break;
        }
        if window.is_before_start(start) {
            match habit_skip_step(current, item.repeat) {
                Some(next) => {
                    current = next;
                    continue;
                }
                None => break,
            }
        }

        occurrences.push(Occurrence::on_date(item, current));
        current = match advance_date(current, item.repeat) {
            Some(next) => next,
            None => break,
        };
    }

    if candidates == MAX_GENERATED_OCCURRENCES {
        debug!(
            "event=expand module=recurrence status=capped kind=habit item_id={} emitted={}",
            item.id,
            occurrences.len()
        );
    }
    occurrences
}

/// Catch-up step while a habit walk is still before the window.
///
/// Deliberately coarser than the habit's period: one day for daily and
/// non-repeating habits, one week otherwise.
fn habit_skip_step(date: NaiveDate, repeat: Repeat) -> Option<NaiveDate> {
    let days = match repeat {
        Repeat::Daily | Repeat::None => 1,
        Repeat::Weekly | Repeat::Monthly => 7,
    };
    date.checked_add_days(Days::new(days))
}
