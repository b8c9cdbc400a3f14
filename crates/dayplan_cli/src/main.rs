//! Command-line front end for the dayplan core.
//!
//! # Responsibility
//! - Open the store and drive calendar and project service use-cases.
//! - Print the calendar feed (occurrences, then project deadlines) as the
//!   widget's JSON array.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dayplan_core::db::open_db;
use dayplan_core::{
    core_version, default_log_level, init_logging, parse_window_bound, AddTaskRequest,
    CalendarEntry, CalendarService, CreateHabitRequest, CreateProjectRequest, ItemKind, Project,
    ProjectService, RecurringItem, Repeat, ScheduleEventRequest, SqliteItemRepository,
    SqliteProjectRepository, Task, TaskPriority, TaskStatus, ViewWindow,
};
use log::info;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "dayplan")]
#[command(about = "Manage calendar events and habits and print their occurrences")]
struct Cli {
    /// SQLite database file holding events and habits
    #[arg(long, env = "DAYPLAN_DB", default_value = "dayplan.sqlite3")]
    db: PathBuf,

    /// Identity whose items are read and written
    #[arg(long, env = "DAYPLAN_OWNER", default_value = "local")]
    owner: String,

    /// trace|debug|info|warn|error (defaults by build mode)
    #[arg(long, env = "DAYPLAN_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "DAYPLAN_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Schedule a calendar event
    AddEvent {
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Start instant (e.g. "2025-03-20T15:00" or RFC 3339)
        #[arg(long, value_parser = parse_instant)]
        start: DateTime<Utc>,

        /// End instant
        #[arg(long, value_parser = parse_instant)]
        end: Option<DateTime<Utc>>,

        #[arg(long)]
        all_day: bool,

        /// none|daily|weekly|monthly
        #[arg(long, default_value = "none", value_parser = parse_repeat)]
        repeat: Repeat,

        /// Last date a repeat may start on (YYYY-MM-DD)
        #[arg(long)]
        until: Option<NaiveDate>,
    },
    /// Create a habit
    AddHabit {
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last day (YYYY-MM-DD); defaults to the first day
        #[arg(long)]
        end: Option<NaiveDate>,

        /// none|daily|weekly|monthly
        #[arg(long, default_value = "daily", value_parser = parse_repeat)]
        repeat: Repeat,
    },
    /// List stored events and habits
    List {
        /// event|habit
        #[arg(long, value_parser = parse_kind)]
        kind: Option<ItemKind>,
    },
    /// Create a project
    AddProject {
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Due date (YYYY-MM-DD); not before today
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// List projects
    Projects,
    /// Add a task to a project
    AddTask {
        project: Uuid,

        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// pending|in_progress|completed
        #[arg(long, default_value = "pending", value_parser = parse_status)]
        status: TaskStatus,

        /// low|medium|high
        #[arg(long, default_value = "medium", value_parser = parse_priority)]
        priority: TaskPriority,

        /// Due date (YYYY-MM-DD); not in the past
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// List a project's tasks
    Tasks { project: Uuid },
    /// Check a task off (or back on with --undo)
    TaskDone {
        id: Uuid,

        #[arg(long)]
        undo: bool,
    },
    /// Delete a project and its tasks
    DeleteProject { id: Uuid },
    /// Delete a task
    DeleteTask { id: Uuid },
    /// Print occurrences and project deadlines for a window as JSON
    Feed {
        /// Window start; unbounded when omitted
        #[arg(long)]
        start: Option<String>,

        /// Window end; unbounded when omitted
        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        pretty: bool,
    },
    /// Print one item's first occurrence as JSON
    Show { id: Uuid },
    /// Delete an event or habit
    Delete { id: Uuid },
    /// Print the core version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or(default_log_level().as_str());
        start_logging(level, log_dir)?;
    }

    if let Command::Version = cli.command {
        println!("dayplan_core version={}", core_version());
        return Ok(());
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let service = CalendarService::new(SqliteItemRepository::try_new(&conn)?);
    let projects = ProjectService::new(SqliteProjectRepository::try_new(&conn)?);
    let owner = cli.owner.as_str();

    match cli.command {
        Command::AddEvent {
            title,
            description,
            start,
            end,
            all_day,
            repeat,
            until,
        } => {
            let request = ScheduleEventRequest {
                title,
                description,
                start,
                end,
                all_day,
                repeat,
                repeat_until: until,
            };
            let id = service.schedule_event(owner, &request)?;
            println!("{id}");
        }
        Command::AddHabit {
            title,
            description,
            start,
            end,
            repeat,
        } => {
            let request = CreateHabitRequest {
                title,
                description,
                start_date: start,
                end_date: end,
                repeat,
            };
            let id = service.create_habit(owner, &request)?;
            println!("{id}");
        }
        Command::List { kind } => {
            for item in service.list_items(owner, kind)? {
                println!("{}", list_line(&item));
            }
        }
        Command::AddProject {
            title,
            description,
            due,
        } => {
            let request = CreateProjectRequest {
                title,
                description,
                due_date: due,
            };
            let id = projects.create_project(owner, &request)?;
            println!("{id}");
        }
        Command::Projects => {
            for project in projects.list_projects(owner)? {
                println!("{}", project_line(&project));
            }
        }
        Command::AddTask {
            project,
            title,
            description,
            status,
            priority,
            due,
        } => {
            let request = AddTaskRequest {
                title,
                description,
                status,
                priority,
                due_date: due,
            };
            let id = projects.add_task(owner, project, &request)?;
            println!("{id}");
        }
        Command::Tasks { project } => {
            for task in projects.list_tasks(owner, project)? {
                println!("{}", task_line(&task));
            }
        }
        Command::TaskDone { id, undo } => {
            let task = projects.set_task_done(owner, id, !undo)?;
            println!("{}\t{}", task.id, task.status.label());
        }
        Command::DeleteProject { id } => {
            projects.delete_project(owner, id)?;
            println!("deleted {id}");
        }
        Command::DeleteTask { id } => {
            projects.delete_task(owner, id)?;
            println!("deleted {id}");
        }
        Command::Feed { start, end, pretty } => {
            let window = ViewWindow::from_params(start.as_deref(), end.as_deref());
            let occurrences = service.calendar_feed_in(owner, &window)?;
            let deadlines = projects.deadlines_in(owner, &window)?;
            info!(
                "event=cli_feed module=cli status=ok occurrences={} deadlines={}",
                occurrences.len(),
                deadlines.len()
            );
            let feed = CalendarEntry::merge(occurrences, deadlines);
            let json = if pretty {
                serde_json::to_string_pretty(&feed)?
            } else {
                serde_json::to_string(&feed)?
            };
            println!("{json}");
        }
        Command::Show { id } => {
            let detail = service.item_detail(owner, id)?;
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
        Command::Delete { id } => {
            service.delete_item(owner, id)?;
            println!("deleted {id}");
        }
        Command::Version => {}
    }

    Ok(())
}

fn list_line(item: &RecurringItem) -> String {
    let until = item
        .repeat_until()
        .map(|date| date.to_string())
        .unwrap_or_else(|| "-".to_string());
    let status = if item.is_active() { "" } else { " (inactive)" };
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}{}",
        item.id,
        item.kind().as_str(),
        item.repeat.as_str(),
        item.anchor_start().to_rfc3339(),
        until,
        item.title,
        status
    )
}

fn project_line(project: &Project) -> String {
    let due = project
        .due_date
        .map(|date| date.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!("{}\t{}\t{}", project.id, due, project.title)
}

fn task_line(task: &Task) -> String {
    let due = task
        .due_date
        .map(|date| date.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mark = if task.is_done { "x" } else { " " };
    format!(
        "[{mark}] {}\t{}\t{}\t{}\t{}",
        task.id,
        task.priority.as_str(),
        task.status.label(),
        due,
        task.title
    )
}

fn start_logging(level: &str, log_dir: &str) -> Result<()> {
    init_logging(level, log_dir)
        .with_context(|| format!("failed to initialize logging in `{log_dir}`"))
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    parse_window_bound(value).ok_or_else(|| format!("invalid date/time `{value}`"))
}

fn parse_repeat(value: &str) -> Result<Repeat, String> {
    Repeat::parse(value).ok_or_else(|| {
        format!("invalid repeat `{value}`; expected none|daily|weekly|monthly")
    })
}

fn parse_kind(value: &str) -> Result<ItemKind, String> {
    ItemKind::parse(value).ok_or_else(|| format!("invalid kind `{value}`; expected event|habit"))
}

fn parse_status(value: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(value).ok_or_else(|| {
        format!("invalid status `{value}`; expected pending|in_progress|completed")
    })
}

fn parse_priority(value: &str) -> Result<TaskPriority, String> {
    TaskPriority::parse(value)
        .ok_or_else(|| format!("invalid priority `{value}`; expected low|medium|high"))
}
