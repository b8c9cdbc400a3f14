//! Concrete calendar occurrence derived from a recurring item.
//!
//! # Responsibility
//! - Carry one materialized instance of an event or habit.
//! - Serialize to the calendar widget's JSON shape.
//!
//! # Invariants
//! - `occurrence_id` depends only on the item ID and the occurrence date.
//! - Event anchors use the bare item ID; every other occurrence is suffixed.

use crate::model::item::{midnight_utc, ItemId, ItemKind, RecurringItem, Repeat};
use crate::model::project::ProjectDeadline;
use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One materialized instance of a recurring item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub occurrence_id: String,
    pub item_id: ItemId,
    pub kind: ItemKind,
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub repeat: Repeat,
}

impl Occurrence {
    /// The item's first occurrence exactly as stored.
    pub fn anchor(item: &RecurringItem) -> Self {
        Self::build(
            item,
            item.id.to_string(),
            item.anchor_start(),
            item.anchor_end(),
        )
    }

    /// A generated occurrence starting at `start`.
    pub fn generated(
        item: &RecurringItem,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        let occurrence_id = format!("{}-{}", item.id, start.format(DATE_FORMAT));
        Self::build(item, occurrence_id, start, end)
    }

    /// A generated all-day occurrence on `date`.
    pub fn on_date(item: &RecurringItem, date: NaiveDate) -> Self {
        Self::generated(item, midnight_utc(date), None)
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    fn build(
        item: &RecurringItem,
        occurrence_id: String,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            occurrence_id,
            item_id: item.id,
            kind: item.kind(),
            title: item.title.clone(),
            description: item.description.clone(),
            start,
            end,
            all_day: item.is_all_day(),
            repeat: item.repeat,
        }
    }

    fn format_instant(&self, instant: DateTime<Utc>) -> String {
        match self.kind {
            ItemKind::Event => instant.to_rfc3339(),
            ItemKind::Habit => instant.format(DATE_FORMAT).to_string(),
        }
    }
}

impl Serialize for Occurrence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let is_habit = self.kind == ItemKind::Habit;
        let field_count = if is_habit { 8 } else { 7 };
        let mut state = serializer.serialize_struct("Occurrence", field_count)?;
        state.serialize_field("id", &self.occurrence_id)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("start", &self.format_instant(self.start))?;
        state.serialize_field("end", &self.end.map(|end| self.format_instant(end)))?;
        state.serialize_field("allDay", &self.all_day)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("repeat", self.repeat.as_str())?;
        if is_habit {
            state.serialize_field("type", ItemKind::Habit.as_str())?;
        }
        state.end()
    }
}

/// One entry of the calendar widget's array.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum CalendarEntry {
    Occurrence(Occurrence),
    Deadline(ProjectDeadline),
}

impl CalendarEntry {
    /// Item occurrences first, then project deadlines, each in given order.
    pub fn merge(occurrences: Vec<Occurrence>, deadlines: Vec<ProjectDeadline>) -> Vec<Self> {
        occurrences
            .into_iter()
            .map(Self::Occurrence)
            .chain(deadlines.into_iter().map(Self::Deadline))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Occurrence;
    use crate::model::item::{RecurringItem, Repeat, Schedule};
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn event_json_uses_widget_field_names() {
        let start = Utc.with_ymd_and_hms(2025, 1, 30, 9, 0, 0).unwrap();
        let mut event = RecurringItem::event("alice", "standup", start);
        event.id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
        event.description = "daily sync".to_string();
        event.repeat = Repeat::Daily;

        let json = serde_json::to_value(Occurrence::anchor(&event)).unwrap();
        assert_eq!(json["id"], "11111111-2222-4333-8444-555555555555");
        assert_eq!(json["title"], "standup");
        assert_eq!(json["start"], "2025-01-30T09:00:00+00:00");
        assert!(json["end"].is_null());
        assert_eq!(json["allDay"], false);
        assert_eq!(json["description"], "daily sync");
        assert_eq!(json["repeat"], "daily");
        assert!(json.get("type").is_none());
    }

    #[test]
    fn habit_json_carries_type_and_plain_dates() {
        let day = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        let mut habit = RecurringItem::habit("alice", "walk", day);
        habit.id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
        if let Schedule::Habit { end_date, .. } = &mut habit.schedule {
            *end_date = Some(day);
        }

        let json = serde_json::to_value(Occurrence::on_date(&habit, day)).unwrap();
        assert_eq!(json["id"], "11111111-2222-4333-8444-555555555555-2025-02-03");
        assert_eq!(json["start"], "2025-02-03");
        assert!(json["end"].is_null());
        assert_eq!(json["allDay"], true);
        assert_eq!(json["type"], "habit");
    }
}
