//! Recurring item domain model.
//!
//! # Responsibility
//! - Define the canonical record for calendar events and habits.
//! - Provide validation helpers used by repository and service write paths.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - Event `end` is never earlier than `start` when set.
//! - A repeat bound is never earlier than the first occurrence's date.
//! - Habit occurrences are always all-day.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every recurring item.
pub type ItemId = Uuid;

/// Maximum title length accepted by validation, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Discriminant for the two recurring item variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Event,
    Habit,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Habit => "habit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "event" => Some(Self::Event),
            "habit" => Some(Self::Habit),
            _ => None,
        }
    }
}

/// Repetition period of a recurring item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Repeat {
    /// Wire and storage name (`none|daily|weekly|monthly`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Parses a wire name. Empty input maps to `None` like an unset form field.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Some(Self::None),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    pub fn is_repeating(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Kind-specific scheduling data.
///
/// The variant selects the expansion policy: events always emit their anchor
/// and are bounded by `repeat_until`, habits walk day-granular dates bounded
/// by `end_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    Event {
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        all_day: bool,
        /// Inclusive bound on generated start dates.
        repeat_until: Option<NaiveDate>,
    },
    Habit {
        start_date: NaiveDate,
        /// Inclusive bound; `None` means a single-day habit.
        end_date: Option<NaiveDate>,
        active: bool,
    },
}

/// Canonical record for a repeating calendar event or habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringItem {
    pub id: ItemId,
    /// Identity of the creating user. Used for store scoping only.
    pub owner: String,
    pub title: String,
    pub description: String,
    pub repeat: Repeat,
    pub schedule: Schedule,
}

impl RecurringItem {
    /// Creates a non-repeating, timed event with a generated ID.
    pub fn event(owner: impl Into<String>, title: impl Into<String>, start: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            title: title.into(),
            description: String::new(),
            repeat: Repeat::None,
            schedule: Schedule::Event {
                start,
                end: None,
                all_day: false,
                repeat_until: None,
            },
        }
    }

    /// Creates an active single-day habit with a generated ID.
    ///
    /// Habits default to daily repetition; callers set `end_date` to widen
    /// the walk beyond `start_date`.
    pub fn habit(
        owner: impl Into<String>,
        title: impl Into<String>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            title: title.into(),
            description: String::new(),
            repeat: Repeat::Daily,
            schedule: Schedule::Habit {
                start_date,
                end_date: None,
                active: true,
            },
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self.schedule {
            Schedule::Event { .. } => ItemKind::Event,
            Schedule::Habit { .. } => ItemKind::Habit,
        }
    }

    /// First occurrence start. Habit dates resolve to midnight UTC.
    pub fn anchor_start(&self) -> DateTime<Utc> {
        match self.schedule {
            Schedule::Event { start, .. } => start,
            Schedule::Habit { start_date, .. } => midnight_utc(start_date),
        }
    }

    pub fn anchor_end(&self) -> Option<DateTime<Utc>> {
        match self.schedule {
            Schedule::Event { end, .. } => end,
            Schedule::Habit { .. } => None,
        }
    }

    pub fn is_all_day(&self) -> bool {
        match self.schedule {
            Schedule::Event { all_day, .. } => all_day,
            Schedule::Habit { .. } => true,
        }
    }

    /// Effective inclusive bound on generated start dates.
    ///
    /// Habits without an `end_date` are bounded by their own start date.
    pub fn repeat_until(&self) -> Option<NaiveDate> {
        match self.schedule {
            Schedule::Event { repeat_until, .. } => repeat_until,
            Schedule::Habit {
                start_date,
                end_date,
                ..
            } => Some(end_date.unwrap_or(start_date)),
        }
    }

    /// Inactive habits are hidden from the calendar feed.
    pub fn is_active(&self) -> bool {
        match self.schedule {
            Schedule::Event { .. } => true,
            Schedule::Habit { active, .. } => active,
        }
    }

    /// Checks structural invariants that do not depend on the current time.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.id.is_nil() {
            return Err(ItemValidationError::NilId);
        }
        if self.owner.trim().is_empty() {
            return Err(ItemValidationError::EmptyOwner);
        }
        if self.title.trim().is_empty() {
            return Err(ItemValidationError::EmptyTitle);
        }
        let title_chars = self.title.chars().count();
        if title_chars > MAX_TITLE_CHARS {
            return Err(ItemValidationError::TitleTooLong { chars: title_chars });
        }

        match self.schedule {
            Schedule::Event {
                start,
                end,
                repeat_until,
                ..
            } => {
                if end.is_some_and(|end| end < start) {
                    return Err(ItemValidationError::EndBeforeStart);
                }
                if self.repeat.is_repeating()
                    && repeat_until.is_some_and(|until| until < start.date_naive())
                {
                    return Err(ItemValidationError::RepeatUntilBeforeStart);
                }
            }
            Schedule::Habit {
                start_date,
                end_date,
                ..
            } => {
                if end_date.is_some_and(|end| end < start_date) {
                    return Err(ItemValidationError::EndDateBeforeStartDate);
                }
            }
        }

        Ok(())
    }

    /// Rejects items whose first occurrence lies before `now`.
    ///
    /// Events compare instants; habits compare calendar dates so a habit
    /// starting today is always accepted.
    pub fn validate_not_in_past(&self, now: DateTime<Utc>) -> Result<(), ItemValidationError> {
        let in_past = match self.schedule {
            Schedule::Event { start, .. } => start < now,
            Schedule::Habit { start_date, .. } => start_date < now.date_naive(),
        };
        if in_past {
            return Err(ItemValidationError::StartInPast);
        }
        Ok(())
    }
}

/// Midnight UTC of `date`.
pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Validation failure for recurring item writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    NilId,
    EmptyOwner,
    EmptyTitle,
    TitleTooLong { chars: usize },
    EndBeforeStart,
    RepeatUntilBeforeStart,
    EndDateBeforeStartDate,
    StartInPast,
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "item id must not be nil"),
            Self::EmptyOwner => write!(f, "item owner must not be empty"),
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { chars } => write!(
                f,
                "title has {chars} characters; at most {MAX_TITLE_CHARS} are allowed"
            ),
            Self::EndBeforeStart => write!(f, "end time cannot be before start time"),
            Self::RepeatUntilBeforeStart => {
                write!(f, "repeat until date cannot be before start date")
            }
            Self::EndDateBeforeStartDate => {
                write!(f, "habit end date cannot be before start date")
            }
            Self::StartInPast => write!(f, "start cannot be in the past"),
        }
    }
}

impl Error for ItemValidationError {}
