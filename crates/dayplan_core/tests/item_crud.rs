use chrono::{NaiveDate, TimeZone, Utc};
use dayplan_core::db::{open_db_in_memory, SCHEMA_VERSION};
use dayplan_core::{
    ItemKind, ItemListQuery, ItemRepository, RecurringItem, RepoError, Repeat, Schedule,
    SqliteItemRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn weekly_event(owner: &str, day: u32) -> RecurringItem {
    let start = Utc.with_ymd_and_hms(2030, 3, day, 9, 0, 0).unwrap();
    let mut event = RecurringItem::event(owner, "planning", start);
    event.description = "sprint planning".to_string();
    event.repeat = Repeat::Weekly;
    event.schedule = Schedule::Event {
        start,
        end: Some(start + chrono::Duration::hours(1)),
        all_day: false,
        repeat_until: Some(date(2030, 6, 30)),
    };
    event
}

#[test]
fn create_and_get_roundtrip_for_events() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let event = weekly_event("alice", 4);
    let id = repo.create_item(&event).unwrap();

    let loaded = repo.get_item(id).unwrap().unwrap();
    assert_eq!(loaded, event);
}

#[test]
fn create_and_get_roundtrip_for_habits() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut habit = RecurringItem::habit("alice", "meditate", date(2030, 1, 1));
    habit.repeat = Repeat::Monthly;
    habit.schedule = Schedule::Habit {
        start_date: date(2030, 1, 1),
        end_date: Some(date(2030, 12, 31)),
        active: false,
    };
    repo.create_item(&habit).unwrap();

    let loaded = repo.get_item(habit.id).unwrap().unwrap();
    assert_eq!(loaded, habit);
    assert_eq!(loaded.kind(), ItemKind::Habit);
}

#[test]
fn update_existing_item() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut event = weekly_event("alice", 4);
    repo.create_item(&event).unwrap();

    event.title = "retro".to_string();
    event.repeat = Repeat::None;
    repo.update_item(&event).unwrap();

    let loaded = repo.get_item(event.id).unwrap().unwrap();
    assert_eq!(loaded.title, "retro");
    assert_eq!(loaded.repeat, Repeat::None);
}

#[test]
fn update_and_delete_of_unknown_item_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let event = weekly_event("alice", 4);
    let update_err = repo.update_item(&event).unwrap_err();
    assert!(matches!(update_err, RepoError::NotFound(id) if id == event.id));

    let delete_err = repo.delete_item(event.id).unwrap_err();
    assert!(matches!(delete_err, RepoError::NotFound(id) if id == event.id));
}

#[test]
fn delete_removes_item() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let event = weekly_event("alice", 4);
    repo.create_item(&event).unwrap();
    repo.delete_item(event.id).unwrap();

    assert!(repo.get_item(event.id).unwrap().is_none());
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut invalid = weekly_event("alice", 4);
    if let Schedule::Event { start, end, .. } = &mut invalid.schedule {
        *end = Some(*start - chrono::Duration::minutes(5));
    }
    let create_err = repo.create_item(&invalid).unwrap_err();
    assert!(matches!(create_err, RepoError::Validation(_)));

    let mut valid = weekly_event("alice", 4);
    repo.create_item(&valid).unwrap();
    valid.title = "   ".to_string();
    let update_err = repo.update_item(&valid).unwrap_err();
    assert!(matches!(update_err, RepoError::Validation(_)));
}

#[test]
fn list_is_scoped_by_owner_and_ordered_by_start() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let late = weekly_event("alice", 20);
    let early = weekly_event("alice", 2);
    let foreign = weekly_event("bob", 1);
    repo.create_item(&late).unwrap();
    repo.create_item(&early).unwrap();
    repo.create_item(&foreign).unwrap();

    let items = repo.list_items(&ItemListQuery::for_owner("alice")).unwrap();
    let ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![early.id, late.id]);
}

#[test]
fn list_filters_kind_and_hides_inactive_habits_by_default() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let event = weekly_event("alice", 4);
    let active = RecurringItem::habit("alice", "run", date(2030, 3, 1));
    let mut paused = RecurringItem::habit("alice", "swim", date(2030, 3, 2));
    if let Schedule::Habit { active, .. } = &mut paused.schedule {
        *active = false;
    }
    repo.create_item(&event).unwrap();
    repo.create_item(&active).unwrap();
    repo.create_item(&paused).unwrap();

    let habits = ItemListQuery {
        kind: Some(ItemKind::Habit),
        ..ItemListQuery::for_owner("alice")
    };
    let visible = repo.list_items(&habits).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, active.id);

    let with_inactive = ItemListQuery {
        include_inactive: true,
        ..habits
    };
    assert_eq!(repo.list_items(&with_inactive).unwrap().len(), 2);
}

#[test]
fn corrupted_rows_are_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let event = weekly_event("alice", 4);
    repo.create_item(&event).unwrap();
    conn.execute(
        "UPDATE recurring_items SET repeat_until = 'someday' WHERE uuid = ?1;",
        [event.id.to_string()],
    )
    .unwrap();

    let err = repo.get_item(event.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("someday")));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteItemRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, SCHEMA_VERSION),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}
