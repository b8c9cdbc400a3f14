//! Project and task use-case service.
//!
//! # Responsibility
//! - Create, edit and delete one owner's projects and the tasks inside them.
//! - Check tasks off and collect project deadlines for the calendar.
//!
//! # Invariants
//! - Tasks are owned through their project; foreign records read as not found.
//! - A task due date may not lie before the service clock's current date.

use crate::model::item::midnight_utc;
use crate::model::project::{
    Project, ProjectDeadline, ProjectId, ProjectValidationError, Task, TaskId, TaskPriority,
    TaskStatus,
};
use crate::recurrence::ViewWindow;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoError;
use crate::service::calendar_service::Clock;
use chrono::{NaiveDate, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for project and task use-cases.
#[derive(Debug)]
pub enum ProjectServiceError {
    Validation(ProjectValidationError),
    /// Project does not exist or belongs to another owner.
    ProjectNotFound(ProjectId),
    /// Task does not exist or its project belongs to another owner.
    TaskNotFound(TaskId),
    Repo(RepoError),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ProjectValidation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ProjectValidationError> for ProjectServiceError {
    fn from(value: ProjectValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type ProjectResult<T> = Result<T, ProjectServiceError>;

/// Request model for creating a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
}

/// Request model for adding a task to a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddTaskRequest {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
}

pub struct ProjectService<R: ProjectRepository> {
    repo: R,
    clock: Clock,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, Utc::now)
    }

    pub fn with_clock(repo: R, clock: Clock) -> Self {
        Self { repo, clock }
    }

    /// Creates a project for `owner`, stamped with the clock's `now`.
    pub fn create_project(
        &self,
        owner: &str,
        request: &CreateProjectRequest,
    ) -> ProjectResult<ProjectId> {
        let project = Project {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            title: request.title.clone(),
            description: request.description.clone(),
            created_at: (self.clock)(),
            due_date: request.due_date,
        };
        let id = self.repo.create_project(&project)?;
        info!("event=project_create module=service status=ok project_id={id}");
        Ok(id)
    }

    /// Replaces title, description and due date of an owned project.
    ///
    /// The stored owner and creation time are kept.
    pub fn update_project(&self, owner: &str, project: &Project) -> ProjectResult<()> {
        let stored = self.get_project(owner, project.id)?;
        let updated = Project {
            owner: stored.owner,
            created_at: stored.created_at,
            ..project.clone()
        };
        self.repo.update_project(&updated)?;
        info!(
            "event=project_update module=service status=ok project_id={}",
            project.id
        );
        Ok(())
    }

    pub fn get_project(&self, owner: &str, id: ProjectId) -> ProjectResult<Project> {
        self.repo
            .get_project(id)?
            .filter(|project| project.owner == owner)
            .ok_or(ProjectServiceError::ProjectNotFound(id))
    }

    pub fn list_projects(&self, owner: &str) -> ProjectResult<Vec<Project>> {
        Ok(self.repo.list_projects(owner)?)
    }

    /// Deletes an owned project together with its tasks.
    pub fn delete_project(&self, owner: &str, id: ProjectId) -> ProjectResult<()> {
        self.get_project(owner, id)?;
        self.repo.delete_project(id)?;
        info!("event=project_delete module=service status=ok project_id={id}");
        Ok(())
    }

    /// Adds a task to an owned project.
    pub fn add_task(
        &self,
        owner: &str,
        project_id: ProjectId,
        request: &AddTaskRequest,
    ) -> ProjectResult<TaskId> {
        self.get_project(owner, project_id)?;
        let mut task = Task {
            id: Uuid::new_v4(),
            project_id,
            title: request.title.clone(),
            description: request.description.clone(),
            status: request.status,
            priority: request.priority,
            due_date: request.due_date,
            created_at: (self.clock)(),
            is_done: false,
        };
        if request.status == TaskStatus::Completed {
            task.set_done(true);
        }
        task.validate_due_not_in_past(self.today())?;
        let id = self.repo.create_task(&task)?;
        info!(
            "event=task_create module=service status=ok project_id={project_id} task_id={id} \
             priority={}",
            task.priority.as_str()
        );
        Ok(id)
    }

    /// Replaces an owned task.
    ///
    /// The due date is checked against today only when it changes, so
    /// overdue tasks stay editable.
    pub fn update_task(&self, owner: &str, task: &Task) -> ProjectResult<()> {
        let stored = self.get_task(owner, task.id)?;
        if task.project_id != stored.project_id {
            self.get_project(owner, task.project_id)?;
        }
        if task.due_date != stored.due_date {
            task.validate_due_not_in_past(self.today())?;
        }
        let updated = Task {
            created_at: stored.created_at,
            ..task.clone()
        };
        self.repo.update_task(&updated)?;
        info!(
            "event=task_update module=service status=ok task_id={} status_value={}",
            task.id,
            task.status.as_str()
        );
        Ok(())
    }

    /// Loads a task whose project is owned by `owner`.
    pub fn get_task(&self, owner: &str, id: TaskId) -> ProjectResult<Task> {
        let task = self
            .repo
            .get_task(id)?
            .ok_or(ProjectServiceError::TaskNotFound(id))?;
        match self.get_project(owner, task.project_id) {
            Ok(_) => Ok(task),
            Err(ProjectServiceError::ProjectNotFound(_)) => {
                Err(ProjectServiceError::TaskNotFound(id))
            }
            Err(err) => Err(err),
        }
    }

    pub fn list_tasks(&self, owner: &str, project_id: ProjectId) -> ProjectResult<Vec<Task>> {
        self.get_project(owner, project_id)?;
        Ok(self.repo.list_tasks(project_id)?)
    }

    pub fn delete_task(&self, owner: &str, id: TaskId) -> ProjectResult<()> {
        self.get_task(owner, id)?;
        self.repo.delete_task(id)?;
        info!("event=task_delete module=service status=ok task_id={id}");
        Ok(())
    }

    /// Checks or unchecks a task and returns its new state.
    pub fn set_task_done(&self, owner: &str, id: TaskId, done: bool) -> ProjectResult<Task> {
        let mut task = self.get_task(owner, id)?;
        task.set_done(done);
        self.repo.update_task(&task)?;
        info!(
            "event=task_toggle module=service status=ok task_id={id} done={done} status_value={}",
            task.status.as_str()
        );
        Ok(task)
    }

    /// Due dates of `owner`'s projects that fall inside `window`.
    ///
    /// A due date counts as midnight UTC of that day.
    pub fn deadlines_in(
        &self,
        owner: &str,
        window: &ViewWindow,
    ) -> ProjectResult<Vec<ProjectDeadline>> {
        Ok(self
            .repo
            .list_projects(owner)?
            .iter()
            .filter_map(Project::deadline)
            .filter(|deadline| {
                let start = midnight_utc(deadline.due_date);
                !window.is_before_start(start) && !window.is_past_end(start)
            })
            .collect())
    }

    fn today(&self) -> NaiveDate {
        (self.clock)().date_naive()
    }
}
