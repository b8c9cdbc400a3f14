//! Recurring item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and owner-scoped listing over `recurring_items` storage.
//! - Keep SQL and column encoding details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `RecurringItem::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing order is `anchor_start ASC, uuid ASC`.

use super::{
    bool_to_int, check_schema, format_date, int_to_bool, parse_date, parse_uuid, RepoError,
    RepoResult,
};
use crate::model::item::{midnight_utc, ItemId, ItemKind, RecurringItem, Repeat, Schedule};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    owner,
    kind,
    title,
    description,
    anchor_start,
    anchor_end,
    all_day,
    repeat,
    repeat_until,
    active
FROM recurring_items";

/// Query options for listing one owner's items.
#[derive(Debug, Clone, Default)]
pub struct ItemListQuery {
    pub owner: String,
    pub kind: Option<ItemKind>,
    /// Include habits with `active = false`.
    pub include_inactive: bool,
}

impl ItemListQuery {
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Self::default()
        }
    }
}

/// Repository interface for recurring item CRUD operations.
pub trait ItemRepository {
    fn create_item(&self, item: &RecurringItem) -> RepoResult<ItemId>;
    fn update_item(&self, item: &RecurringItem) -> RepoResult<()>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<RecurringItem>>;
    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<RecurringItem>>;
    fn delete_item(&self, id: ItemId) -> RepoResult<()>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Wraps a connection opened through `open_db*`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` is not
    ///   [`SCHEMA_VERSION`](crate::db::SCHEMA_VERSION).
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        check_schema(conn)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, item: &RecurringItem) -> RepoResult<ItemId> {
        item.validate()?;
        let row = ItemColumns::from_item(item);

        self.conn.execute(
            "INSERT INTO recurring_items (
                uuid,
                owner,
                kind,
                title,
                description,
                anchor_start,
                anchor_end,
                all_day,
                repeat,
                repeat_until,
                active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                item.id.to_string(),
                item.owner.as_str(),
                item.kind().as_str(),
                item.title.as_str(),
                item.description.as_str(),
                row.anchor_start,
                row.anchor_end,
                bool_to_int(row.all_day),
                item.repeat.as_str(),
                row.repeat_until,
                bool_to_int(row.active),
            ],
        )?;

        Ok(item.id)
    }

    fn update_item(&self, item: &RecurringItem) -> RepoResult<()> {
        item.validate()?;
        let row = ItemColumns::from_item(item);

        let changed = self.conn.execute(
            "UPDATE recurring_items
             SET
                owner = ?1,
                kind = ?2,
                title = ?3,
                description = ?4,
                anchor_start = ?5,
                anchor_end = ?6,
                all_day = ?7,
                repeat = ?8,
                repeat_until = ?9,
                active = ?10,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?11;",
            params![
                item.owner.as_str(),
                item.kind().as_str(),
                item.title.as_str(),
                item.description.as_str(),
                row.anchor_start,
                row.anchor_end,
                bool_to_int(row.all_day),
                item.repeat.as_str(),
                row.repeat_until,
                bool_to_int(row.active),
                item.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(item.id));
        }
        Ok(())
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<RecurringItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }
        Ok(None)
    }

    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<RecurringItem>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE owner = ?");
        let mut bind_values = vec![Value::Text(query.owner.clone())];

        if let Some(kind) = query.kind {
            sql.push_str(" AND kind = ?");
            bind_values.push(Value::Text(kind.as_str().to_string()));
        }
        if !query.include_inactive {
            sql.push_str(" AND active = 1");
        }
        sql.push_str(" ORDER BY anchor_start ASC, uuid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM recurring_items WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

/// Column encoding of the schedule variant.
struct ItemColumns {
    anchor_start: i64,
    anchor_end: Option<i64>,
    all_day: bool,
    repeat_until: Option<String>,
    active: bool,
}

impl ItemColumns {
    fn from_item(item: &RecurringItem) -> Self {
        match item.schedule {
            Schedule::Event {
                start,
                end,
                all_day,
                repeat_until,
            } => Self {
                anchor_start: start.timestamp_millis(),
                anchor_end: end.map(|end| end.timestamp_millis()),
                all_day,
                repeat_until: repeat_until.map(format_date),
                active: true,
            },
            Schedule::Habit {
                start_date,
                end_date,
                active,
            } => Self {
                anchor_start: midnight_utc(start_date).timestamp_millis(),
                anchor_end: None,
                all_day: true,
                repeat_until: end_date.map(format_date),
                active,
            },
        }
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<RecurringItem> {
    let id = parse_uuid(&row.get::<_, String>("uuid")?, "recurring_items.uuid")?;

    let kind_text: String = row.get("kind")?;
    let kind = ItemKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid item kind `{kind_text}` in recurring_items.kind"
        ))
    })?;

    let repeat_text: String = row.get("repeat")?;
    let repeat = Repeat::parse(&repeat_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid repeat `{repeat_text}` in recurring_items.repeat"
        ))
    })?;

    let start = parse_millis(row.get("anchor_start")?, "anchor_start")?;
    let end = match row.get::<_, Option<i64>>("anchor_end")? {
        Some(millis) => Some(parse_millis(millis, "anchor_end")?),
        None => None,
    };
    let repeat_until = match row.get::<_, Option<String>>("repeat_until")? {
        Some(text) => Some(parse_date(&text, "recurring_items.repeat_until")?),
        None => None,
    };
    let all_day = int_to_bool(row.get("all_day")?, "recurring_items.all_day")?;
    let active = int_to_bool(row.get("active")?, "recurring_items.active")?;

    let schedule = match kind {
        ItemKind::Event => Schedule::Event {
            start,
            end,
            all_day,
            repeat_until,
        },
        ItemKind::Habit => Schedule::Habit {
            start_date: start.date_naive(),
            end_date: repeat_until,
            active,
        },
    };

    let item = RecurringItem {
        id,
        owner: row.get("owner")?,
        title: row.get("title")?,
        description: row.get("description")?,
        repeat,
        schedule,
    };
    item.validate()?;
    Ok(item)
}

fn parse_millis(millis: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "out-of-range timestamp `{millis}` in recurring_items.{column}"
        ))
    })
}
