//! Core domain logic for dayplan calendar events, habits, projects and tasks.
//! This crate is the single source of truth for scheduling invariants and
//! recurrence expansion.

pub mod db;
pub mod logging;
pub mod model;
pub mod recurrence;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::item::{ItemId, ItemKind, ItemValidationError, RecurringItem, Repeat, Schedule};
pub use model::occurrence::{CalendarEntry, Occurrence};
pub use model::project::{
    Project, ProjectDeadline, ProjectId, ProjectValidationError, Task, TaskId, TaskPriority,
    TaskStatus,
};
pub use recurrence::{expand, parse_window_bound, ViewWindow, MAX_GENERATED_OCCURRENCES};
pub use repo::item_repo::{ItemListQuery, ItemRepository, SqliteItemRepository};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::{RepoError, RepoResult};
pub use service::calendar_service::{
    CalendarResult, CalendarService, CalendarServiceError, Clock, CreateHabitRequest,
    ScheduleEventRequest,
};
pub use service::project_service::{
    AddTaskRequest, CreateProjectRequest, ProjectResult, ProjectService, ProjectServiceError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
