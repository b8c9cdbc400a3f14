//! Calendar use-case service.
//!
//! # Responsibility
//! - Create, update, delete and look up one owner's events and habits.
//! - Build the calendar feed by expanding the owner's items for a window.
//!
//! # Invariants
//! - Every lookup is scoped by owner; foreign items read as not found.
//! - Writes reject items that start before the service clock's `now`.
//! - Feed order is all events, then all habits, each in store order.

use crate::model::item::{ItemId, ItemKind, ItemValidationError, RecurringItem, Repeat, Schedule};
use crate::model::occurrence::Occurrence;
use crate::recurrence::{expand, ViewWindow};
use crate::repo::item_repo::{ItemListQuery, ItemRepository};
use crate::repo::RepoError;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

/// Source of the current instant for not-in-past checks.
pub type Clock = fn() -> DateTime<Utc>;

/// Service error for calendar use-cases.
#[derive(Debug)]
pub enum CalendarServiceError {
    Validation(ItemValidationError),
    /// Item does not exist or belongs to another owner.
    ItemNotFound(ItemId),
    Repo(RepoError),
    Serialization(serde_json::Error),
}

impl Display for CalendarServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "failed to serialize calendar feed: {err}"),
        }
    }
}

impl Error for CalendarServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::ItemNotFound(_) => None,
            Self::Repo(err) => Some(err),
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<RepoError> for CalendarServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ItemNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ItemValidationError> for CalendarServiceError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type CalendarResult<T> = Result<T, CalendarServiceError>;

/// Request model for scheduling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEventRequest {
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub repeat: Repeat,
    pub repeat_until: Option<NaiveDate>,
}

/// Request model for creating a habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateHabitRequest {
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub repeat: Repeat,
}

/// Calendar service facade over repository implementations.
pub struct CalendarService<R: ItemRepository> {
    repo: R,
    clock: Clock,
}

impl<R: ItemRepository> CalendarService<R> {
    /// Creates a service that validates against the system clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, Utc::now)
    }

    pub fn with_clock(repo: R, clock: Clock) -> Self {
        Self { repo, clock }
    }

    /// Schedules an event for `owner` and returns its new ID.
    pub fn schedule_event(
        &self,
        owner: &str,
        request: &ScheduleEventRequest,
    ) -> CalendarResult<ItemId> {
        let item = RecurringItem {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            title: request.title.clone(),
            description: request.description.clone(),
            repeat: request.repeat,
            schedule: Schedule::Event {
                start: request.start,
                end: request.end,
                all_day: request.all_day,
                repeat_until: request.repeat_until,
            },
        };
        self.create(item)
    }

    /// Creates an active habit for `owner` and returns its new ID.
    pub fn create_habit(
        &self,
        owner: &str,
        request: &CreateHabitRequest,
    ) -> CalendarResult<ItemId> {
        let item = RecurringItem {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            title: request.title.clone(),
            description: request.description.clone(),
            repeat: request.repeat,
            schedule: Schedule::Habit {
                start_date: request.start_date,
                end_date: request.end_date,
                active: true,
            },
        };
        self.create(item)
    }

    /// Replaces a stored item owned by `owner`.
    ///
    /// Uses full replacement semantics; the stored owner cannot change.
    pub fn update_item(&self, owner: &str, item: &RecurringItem) -> CalendarResult<()> {
        if item.owner != owner {
            return Err(CalendarServiceError::ItemNotFound(item.id));
        }
        self.get_item(owner, item.id)?;
        self.check_write(item)?;
        self.repo.update_item(item)?;
        info!(
            "event=item_update module=service status=ok kind={} item_id={}",
            item.kind().as_str(),
            item.id
        );
        Ok(())
    }

    pub fn delete_item(&self, owner: &str, id: ItemId) -> CalendarResult<()> {
        let item = self.get_item(owner, id)?;
        self.repo.delete_item(id)?;
        info!(
            "event=item_delete module=service status=ok kind={} item_id={}",
            item.kind().as_str(),
            id
        );
        Ok(())
    }

    /// Loads one item owned by `owner`.
    pub fn get_item(&self, owner: &str, id: ItemId) -> CalendarResult<RecurringItem> {
        self.repo
            .get_item(id)?
            .filter(|item| item.owner == owner)
            .ok_or(CalendarServiceError::ItemNotFound(id))
    }

    /// Detail view of one item: its anchor occurrence.
    pub fn item_detail(&self, owner: &str, id: ItemId) -> CalendarResult<Occurrence> {
        let item = self.get_item(owner, id)?;
        Ok(Occurrence::anchor(&item))
    }

    /// Lists `owner`'s items of `kind` (or all kinds), inactive habits included.
    pub fn list_items(
        &self,
        owner: &str,
        kind: Option<ItemKind>,
    ) -> CalendarResult<Vec<RecurringItem>> {
        let query = ItemListQuery {
            kind,
            include_inactive: true,
            ..ItemListQuery::for_owner(owner)
        };
        Ok(self.repo.list_items(&query)?)
    }

    /// Calendar feed for raw `start`/`end` query parameters.
    ///
    /// Missing or unparsable bounds leave that side of the window open.
    pub fn calendar_feed(
        &self,
        owner: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> CalendarResult<Vec<Occurrence>> {
        self.calendar_feed_in(owner, &ViewWindow::from_params(start, end))
    }

    /// Expands every event and active habit of `owner` inside `window`.
    pub fn calendar_feed_in(
        &self,
        owner: &str,
        window: &ViewWindow,
    ) -> CalendarResult<Vec<Occurrence>> {
        let started_at = Instant::now();
        let mut occurrences = Vec::new();
        let mut item_count = 0usize;

        for kind in [ItemKind::Event, ItemKind::Habit] {
            let query = ItemListQuery {
                kind: Some(kind),
                ..ItemListQuery::for_owner(owner)
            };
            for item in self.repo.list_items(&query)? {
                item_count += 1;
                occurrences.extend(expand(&item, window));
            }
        }

        debug!(
            "event=calendar_feed module=service status=ok items={} occurrences={} bounded={} \
             duration_ms={}",
            item_count,
            occurrences.len(),
            !window.is_unbounded(),
            started_at.elapsed().as_millis()
        );
        Ok(occurrences)
    }

    /// Calendar feed serialized as the widget's JSON array.
    pub fn calendar_feed_json(
        &self,
        owner: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> CalendarResult<String> {
        let occurrences = self.calendar_feed(owner, start, end)?;
        serde_json::to_string(&occurrences).map_err(CalendarServiceError::Serialization)
    }

    fn create(&self, item: RecurringItem) -> CalendarResult<ItemId> {
        self.check_write(&item)?;
        let id = self.repo.create_item(&item)?;
        info!(
            "event=item_create module=service status=ok kind={} repeat={} item_id={}",
            item.kind().as_str(),
            item.repeat.as_str(),
            id
        );
        Ok(id)
    }

    fn check_write(&self, item: &RecurringItem) -> CalendarResult<()> {
        item.validate()?;
        item.validate_not_in_past((self.clock)())?;
        Ok(())
    }
}
