//! Project and task repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - Deleting a project deletes its tasks (`ON DELETE CASCADE`).
//! - Listings are ordered by `created_at ASC, uuid ASC`.

use super::{
    bool_to_int, check_schema, format_date, int_to_bool, parse_date, parse_uuid, RepoError,
    RepoResult,
};
use crate::model::project::{Project, ProjectId, Task, TaskId, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    uuid,
    owner,
    title,
    description,
    due_date,
    created_at
FROM projects";

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    project_uuid,
    title,
    description,
    status,
    priority,
    due_date,
    is_done,
    created_at
FROM tasks";

/// Repository interface for projects and their tasks.
pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn list_projects(&self, owner: &str) -> RepoResult<Vec<Project>>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;

    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, project_id: ProjectId) -> RepoResult<Vec<Task>>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Wraps a connection opened through `open_db*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        check_schema(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;
        self.conn.execute(
            "INSERT INTO projects (uuid, owner, title, description, due_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                project.id.to_string(),
                project.owner.as_str(),
                project.title.as_str(),
                project.description.as_str(),
                project.due_date.map(format_date),
                project.created_at.timestamp_millis(),
            ],
        )?;
        Ok(project.id)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;
        // created_at is fixed at insert time.
        let changed = self.conn.execute(
            "UPDATE projects
             SET owner = ?1, title = ?2, description = ?3, due_date = ?4
             WHERE uuid = ?5;",
            params![
                project.owner.as_str(),
                project.title.as_str(),
                project.description.as_str(),
                project.due_date.map(format_date),
                project.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(project.id));
        }
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_project_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_projects(&self, owner: &str) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL} WHERE owner = ?1 ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([owner])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;
        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                project_uuid,
                title,
                description,
                status,
                priority,
                due_date,
                is_done,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                task.id.to_string(),
                task.project_id.to_string(),
                task.title.as_str(),
                task.description.as_str(),
                task.status.as_str(),
                task.priority.as_str(),
                task.due_date.map(format_date),
                bool_to_int(task.is_done),
                task.created_at.timestamp_millis(),
            ],
        )?;
        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                project_uuid = ?1,
                title = ?2,
                description = ?3,
                status = ?4,
                priority = ?5,
                due_date = ?6,
                is_done = ?7
             WHERE uuid = ?8;",
            params![
                task.project_id.to_string(),
                task.title.as_str(),
                task.description.as_str(),
                task.status.as_str(),
                task.priority.as_str(),
                task.due_date.map(format_date),
                bool_to_int(task.is_done),
                task.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_task_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_tasks(&self, project_id: ProjectId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} WHERE project_uuid = ?1 ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let project = Project {
        id: parse_uuid(&row.get::<_, String>("uuid")?, "projects.uuid")?,
        owner: row.get("owner")?,
        title: row.get("title")?,
        description: row.get("description")?,
        created_at: parse_created_at(row.get("created_at")?, "projects.created_at")?,
        due_date: match row.get::<_, Option<String>>("due_date")? {
            Some(text) => Some(parse_date(&text, "projects.due_date")?),
            None => None,
        },
    };
    project.validate()?;
    Ok(project)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in tasks.status"))
    })?;
    let priority_text: String = row.get("priority")?;
    let priority = TaskPriority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in tasks.priority"
        ))
    })?;

    let task = Task {
        id: parse_uuid(&row.get::<_, String>("uuid")?, "tasks.uuid")?,
        project_id: parse_uuid(&row.get::<_, String>("project_uuid")?, "tasks.project_uuid")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status,
        priority,
        due_date: match row.get::<_, Option<String>>("due_date")? {
            Some(text) => Some(parse_date(&text, "tasks.due_date")?),
            None => None,
        },
        created_at: parse_created_at(row.get("created_at")?, "tasks.created_at")?,
        is_done: int_to_bool(row.get("is_done")?, "tasks.is_done")?,
    };
    task.validate()?;
    Ok(task)
}

fn parse_created_at(millis: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        RepoError::InvalidData(format!("out-of-range timestamp `{millis}` in {column}"))
    })
}
