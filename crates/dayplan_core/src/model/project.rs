//! Project and task domain model.
//!
//! # Responsibility
//! - Define owner-scoped projects and the tasks filed under them.
//! - Provide the all-day deadline entry a project contributes to the calendar.
//!
//! # Invariants
//! - A task belongs to exactly one project; its owner is the project's owner.
//! - A project's due date is never before the day it was created.
//! - `is_done` and `TaskStatus::Completed` are kept in step by [`Task::set_done`].

use crate::model::item::MAX_TITLE_CHARS;
use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ProjectId = Uuid;
pub type TaskId = Uuid;

/// Progress state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Human-readable label shown next to a task.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// A named body of work with an optional deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub owner: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
}

impl Project {
    pub fn new(
        owner: impl Into<String>,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            title: title.into(),
            description: String::new(),
            created_at,
            due_date: None,
        }
    }

    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.id.is_nil() {
            return Err(ProjectValidationError::NilId);
        }
        if self.owner.trim().is_empty() {
            return Err(ProjectValidationError::EmptyOwner);
        }
        validate_title(&self.title)?;
        if self
            .due_date
            .is_some_and(|due| due < self.created_at.date_naive())
        {
            return Err(ProjectValidationError::DueBeforeCreation);
        }
        Ok(())
    }

    /// Calendar entry for the due date, if the project has one.
    pub fn deadline(&self) -> Option<ProjectDeadline> {
        self.due_date.map(|due_date| ProjectDeadline {
            project_id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            due_date,
        })
    }
}

/// A unit of work inside a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub is_done: bool,
}

impl Task {
    pub fn new(
        project_id: ProjectId,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
            created_at,
            is_done: false,
        }
    }

    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.id.is_nil() || self.project_id.is_nil() {
            return Err(ProjectValidationError::NilId);
        }
        validate_title(&self.title)
    }

    /// Rejects a due date before `today`.
    pub fn validate_due_not_in_past(
        &self,
        today: NaiveDate,
    ) -> Result<(), ProjectValidationError> {
        if self.due_date.is_some_and(|due| due < today) {
            return Err(ProjectValidationError::DueInPast);
        }
        Ok(())
    }

    /// Checks or unchecks the task.
    ///
    /// Checking completes it; unchecking a completed task sends it back to
    /// pending and leaves any other status alone.
    pub fn set_done(&mut self, done: bool) {
        self.is_done = done;
        if done {
            self.status = TaskStatus::Completed;
        } else if self.status == TaskStatus::Completed {
            self.status = TaskStatus::Pending;
        }
    }
}

fn validate_title(title: &str) -> Result<(), ProjectValidationError> {
    if title.trim().is_empty() {
        return Err(ProjectValidationError::EmptyTitle);
    }
    let chars = title.chars().count();
    if chars > MAX_TITLE_CHARS {
        return Err(ProjectValidationError::TitleTooLong { chars });
    }
    Ok(())
}

/// All-day calendar entry marking a project's due date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDeadline {
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
}

impl Serialize for ProjectDeadline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ProjectDeadline", 7)?;
        state.serialize_field("id", &format!("project-{}", self.project_id))?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("start", &self.due_date.format("%Y-%m-%d").to_string())?;
        state.serialize_field("end", &Option::<String>::None)?;
        state.serialize_field("allDay", &true)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("type", "project")?;
        state.end()
    }
}

/// Validation failure for project and task writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    NilId,
    EmptyOwner,
    EmptyTitle,
    TitleTooLong { chars: usize },
    DueBeforeCreation,
    DueInPast,
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "project and task ids must not be nil"),
            Self::EmptyOwner => write!(f, "project owner must not be empty"),
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { chars } => write!(
                f,
                "title has {chars} characters; at most {MAX_TITLE_CHARS} are allowed"
            ),
            Self::DueBeforeCreation => {
                write!(f, "project due date cannot be before the creation date")
            }
            Self::DueInPast => write!(f, "task due date cannot be in the past"),
        }
    }
}

impl Error for ProjectValidationError {}
