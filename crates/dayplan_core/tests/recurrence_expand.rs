use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use dayplan_core::{
    expand, ItemKind, Occurrence, RecurringItem, Repeat, Schedule, ViewWindow,
    MAX_GENERATED_OCCURRENCES,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn event(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    repeat: Repeat,
    repeat_until: Option<NaiveDate>,
) -> RecurringItem {
    let mut item = RecurringItem::event("alice", "event", start);
    item.repeat = repeat;
    item.schedule = Schedule::Event {
        start,
        end,
        all_day: false,
        repeat_until,
    };
    item
}

fn habit(start_date: NaiveDate, end_date: Option<NaiveDate>, repeat: Repeat) -> RecurringItem {
    let mut item = RecurringItem::habit("alice", "habit", start_date);
    item.repeat = repeat;
    item.schedule = Schedule::Habit {
        start_date,
        end_date,
        active: true,
    };
    item
}

fn start_dates(occurrences: &[Occurrence]) -> Vec<NaiveDate> {
    occurrences.iter().map(Occurrence::start_date).collect()
}

#[test]
fn non_repeating_event_yields_only_the_anchor() {
    let start = at(2025, 1, 30, 9, 0);
    let item = event(start, Some(at(2025, 1, 30, 10, 0)), Repeat::None, Some(date(2025, 3, 1)));

    let occurrences = expand(&item, &ViewWindow::UNBOUNDED);

    assert_eq!(occurrences, vec![Occurrence::anchor(&item)]);
    assert_eq!(occurrences[0].occurrence_id, item.id.to_string());
}

#[test]
fn repeating_event_without_bound_yields_only_the_anchor() {
    let item = event(at(2025, 1, 30, 9, 0), None, Repeat::Weekly, None);

    assert_eq!(expand(&item, &ViewWindow::UNBOUNDED).len(), 1);
}

#[test]
fn daily_event_stops_after_repeat_until() {
    let item = event(at(2025, 1, 30, 9, 0), None, Repeat::Daily, Some(date(2025, 2, 2)));

    let occurrences = expand(&item, &ViewWindow::UNBOUNDED);

    assert_eq!(
        start_dates(&occurrences),
        vec![
            date(2025, 1, 30),
            date(2025, 1, 31),
            date(2025, 2, 1),
            date(2025, 2, 2)
        ]
    );
    assert_eq!(occurrences[3].start, at(2025, 2, 2, 9, 0));
    assert_eq!(occurrences[3].occurrence_id, format!("{}-2025-02-02", item.id));
    assert!(occurrences.iter().all(|occurrence| occurrence.end.is_none()));
}

#[test]
fn monthly_clamping_drifts_from_the_previous_occurrence() {
    let item = event(at(2025, 1, 31, 10, 0), None, Repeat::Monthly, Some(date(2025, 4, 30)));

    let occurrences = expand(&item, &ViewWindow::UNBOUNDED);

    assert_eq!(
        start_dates(&occurrences),
        vec![
            date(2025, 1, 31),
            date(2025, 2, 28),
            date(2025, 3, 28),
            date(2025, 4, 28)
        ]
    );
}

#[test]
fn monthly_end_is_clamped_against_its_own_month() {
    let item = event(
        at(2024, 1, 28, 22, 0),
        Some(at(2024, 1, 31, 8, 0)),
        Repeat::Monthly,
        Some(date(2024, 3, 31)),
    );

    let occurrences = expand(&item, &ViewWindow::UNBOUNDED);

    assert_eq!(occurrences.len(), 3);
    assert_eq!(occurrences[1].start, at(2024, 2, 28, 22, 0));
    assert_eq!(occurrences[1].end, Some(at(2024, 2, 29, 8, 0)));
    assert_eq!(occurrences[2].start, at(2024, 3, 28, 22, 0));
    assert_eq!(occurrences[2].end, Some(at(2024, 3, 29, 8, 0)));
}

#[test]
fn weekly_event_advances_end_with_start() {
    let item = event(
        at(2025, 3, 3, 9, 0),
        Some(at(2025, 3, 3, 9, 30)),
        Repeat::Weekly,
        Some(date(2025, 3, 17)),
    );

    let occurrences = expand(&item, &ViewWindow::UNBOUNDED);

    assert_eq!(occurrences.len(), 3);
    assert_eq!(occurrences[2].start, at(2025, 3, 17, 9, 0));
    assert_eq!(occurrences[2].end, Some(at(2025, 3, 17, 9, 30)));
}

#[test]
fn event_anchor_survives_window_but_repeats_are_clipped() {
    let item = event(at(2025, 1, 1, 9, 0), None, Repeat::Daily, Some(date(2025, 1, 31)));
    let window = ViewWindow::new(Some(at(2025, 1, 10, 0, 0)), Some(at(2025, 1, 12, 23, 59)));

    let occurrences = expand(&item, &window);

    assert_eq!(
        start_dates(&occurrences),
        vec![
            date(2025, 1, 1),
            date(2025, 1, 10),
            date(2025, 1, 11),
            date(2025, 1, 12)
        ]
    );
    assert_eq!(occurrences[0].occurrence_id, item.id.to_string());
}

#[test]
fn habit_first_date_is_window_filtered() {
    let item = habit(date(2025, 1, 1), Some(date(2025, 1, 31)), Repeat::Daily);
    let window = ViewWindow::new(Some(at(2025, 1, 10, 0, 0)), Some(at(2025, 1, 12, 23, 59)));

    let occurrences = expand(&item, &window);

    assert_eq!(
        start_dates(&occurrences),
        vec![date(2025, 1, 10), date(2025, 1, 11), date(2025, 1, 12)]
    );
    assert!(occurrences
        .iter()
        .all(|occurrence| occurrence.kind == ItemKind::Habit && occurrence.all_day));
}

#[test]
fn monthly_habit_catches_up_in_weekly_steps() {
    let item = habit(date(2025, 1, 1), Some(date(2025, 6, 30)), Repeat::Monthly);
    let window = ViewWindow::new(Some(at(2025, 1, 20, 0, 0)), None);

    let occurrences = expand(&item, &window);

    // Skips land on Jan 8, 15, 22; the walk then resumes monthly from Jan 22.
    assert_eq!(
        start_dates(&occurrences),
        vec![
            date(2025, 1, 22),
            date(2025, 2, 22),
            date(2025, 3, 22),
            date(2025, 4, 22),
            date(2025, 5, 22),
            date(2025, 6, 22)
        ]
    );
}

#[test]
fn non_repeating_habit_yields_its_start_date_only() {
    let item = habit(date(2025, 2, 1), Some(date(2025, 2, 20)), Repeat::None);

    let occurrences = expand(&item, &ViewWindow::UNBOUNDED);

    assert_eq!(start_dates(&occurrences), vec![date(2025, 2, 1)]);
    assert_eq!(occurrences[0].occurrence_id, format!("{}-2025-02-01", item.id));
}

#[test]
fn habit_without_end_date_is_a_single_day() {
    let item = habit(date(2025, 2, 1), None, Repeat::Daily);

    assert_eq!(
        start_dates(&expand(&item, &ViewWindow::UNBOUNDED)),
        vec![date(2025, 2, 1)]
    );
}

#[test]
fn event_expansion_is_capped() {
    let item = event(at(2025, 1, 1, 7, 0), None, Repeat::Daily, Some(date(2099, 12, 31)));

    let occurrences = expand(&item, &ViewWindow::UNBOUNDED);

    assert_eq!(occurrences.len(), MAX_GENERATED_OCCURRENCES + 1);
    assert!(occurrences
        .windows(2)
        .all(|pair| pair[0].start < pair[1].start));
}

#[test]
fn candidates_before_the_window_count_toward_the_cap() {
    let item = event(at(2025, 1, 1, 9, 0), None, Repeat::Daily, Some(date(2026, 12, 31)));
    // The 100th candidate is 2025-04-11, still before June.
    let window = ViewWindow::new(Some(at(2025, 6, 1, 0, 0)), Some(at(2025, 6, 30, 23, 59)));

    assert_eq!(expand(&item, &window), vec![Occurrence::anchor(&item)]);
}

#[test]
fn window_reached_before_the_cap_emits_the_remaining_candidates() {
    let item = event(at(2025, 1, 1, 9, 0), None, Repeat::Daily, Some(date(2026, 12, 31)));
    let window = ViewWindow::new(Some(at(2025, 4, 1, 0, 0)), None);

    let occurrences = expand(&item, &window);

    let dates = start_dates(&occurrences);
    assert_eq!(dates.len(), 12);
    assert_eq!(dates[0], date(2025, 1, 1));
    assert_eq!(dates[1], date(2025, 4, 1));
    assert_eq!(dates[11], date(2025, 4, 11));
}

#[test]
fn far_window_costs_at_most_the_cap() {
    let item = event(at(2025, 1, 1, 7, 0), None, Repeat::Weekly, Some(date(200_000, 12, 31)));
    let window = ViewWindow::new(Some(at(199_999, 1, 1, 0, 0)), None);

    assert_eq!(expand(&item, &window).len(), 1);

    let habit = habit(date(2025, 1, 1), Some(date(200_000, 12, 31)), Repeat::Daily);
    assert!(expand(&habit, &window).is_empty());
}

#[test]
fn window_end_before_anchor_keeps_anchor_only() {
    let item = event(at(2025, 5, 1, 9, 0), None, Repeat::Daily, Some(date(2025, 5, 31)));
    let window = ViewWindow::new(None, Some(at(2025, 4, 30, 0, 0)));

    assert_eq!(expand(&item, &window).len(), 1);
}
