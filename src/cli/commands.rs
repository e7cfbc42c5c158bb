use std::collections::HashMap;

use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use anyhow::{Context, Result};

use crate::actions;
use crate::cli::error::{not_found_with_suggestions, resolve_project, validate_id, validate_non_empty};
use crate::cli::output::{
    format_dashboard, format_project_detail, format_project_list, format_selection,
    format_service_list, format_task_list, format_user_list, RenderOptions,
};
use crate::config::Config;
use crate::db::DbConnection;
use crate::error::Error;
use crate::forms::FormData;
use crate::list::{self, Criteria, SortSpec};
use crate::models::{Project, Selection, Task};
use crate::repo::{CurrentRepo, ProjectRepo, ServiceRepo, TaskRepo, UserRepo};
use crate::stats::DashboardStats;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Taskdeck - projects, tasks and services from the terminal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project management commands
    Projects {
        #[command(subcommand)]
        subcommand: ProjectCommands,
    },
    /// Task management commands
    Tasks {
        #[command(subcommand)]
        subcommand: TaskCommands,
    },
    /// Service (technology tag) commands
    Services {
        #[command(subcommand)]
        subcommand: ServiceCommands,
    },
    /// User records that own projects and services
    Users {
        #[command(subcommand)]
        subcommand: UserCommands,
    },
    /// Show or change the current project
    Current {
        #[command(subcommand)]
        subcommand: CurrentCommands,
    },
    /// Dashboard summary
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a new project
    Add {
        /// Project name
        name: String,
        #[command(flatten)]
        fields: ProjectFields,
    },
    /// List projects
    List {
        /// Only projects with this status ("All" for any)
        #[arg(long)]
        status: Option<String>,
        /// Only projects carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Only projects with this priority
        #[arg(long)]
        priority: Option<String>,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one project and its tasks
    Show {
        /// Project id or name
        project: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Modify a project
    Modify {
        /// Project id or name
        project: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: ProjectFields,
        /// Remove all tags
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },
    /// Delete a project and all of its tasks
    Delete {
        /// Project id or name
        project: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct ProjectFields {
    /// Free-text description
    #[arg(long)]
    pub description: Option<String>,
    /// Planning, In Progress, On Hold, Completed or Cancelled
    #[arg(long)]
    pub status: Option<String>,
    /// Low, Medium, High or Critical
    #[arg(long)]
    pub priority: Option<String>,
    /// Percent complete (0-100)
    #[arg(long)]
    pub completion: Option<String>,
    /// Tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Start date (YYYY-MM-DD, or "none")
    #[arg(long)]
    pub start: Option<String>,
    /// Target end date
    #[arg(long)]
    pub target: Option<String>,
    /// Actual end date
    #[arg(long)]
    pub end: Option<String>,
    /// Repository URL
    #[arg(long)]
    pub git_repo: Option<String>,
    /// Domain name
    #[arg(long)]
    pub domain: Option<String>,
}

impl ProjectFields {
    fn push_into(&self, form: &mut FormData) {
        form.push_opt("description", self.description.as_deref());
        form.push_opt("status", self.status.as_deref());
        form.push_opt("priority", self.priority.as_deref());
        form.push_opt("completion", self.completion.as_deref());
        for tag in &self.tags {
            form.push("tags", tag.as_str());
        }
        form.push_opt("startDate", self.start.as_deref());
        form.push_opt("targetEndDate", self.target.as_deref());
        form.push_opt("actualEndDate", self.end.as_deref());
        form.push_opt("gitRepo", self.git_repo.as_deref());
        form.push_opt("domain", self.domain.as_deref());
    }
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Create a task in a project
    Add {
        /// Task title
        title: String,
        /// Project id or name
        #[arg(long)]
        project: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// List tasks
    List {
        /// Only tasks of this project (id or name)
        #[arg(long)]
        project: Option<String>,
        /// Only tasks with this status
        #[arg(long)]
        status: Option<String>,
        /// Only tasks with this priority
        #[arg(long)]
        priority: Option<String>,
        /// Only tasks assigned to this person
        #[arg(long)]
        assignee: Option<String>,
        /// Only tasks carrying this tag
        #[arg(long)]
        tag: Option<String>,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Modify a task
    Modify {
        /// Task ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// Move to another project (id or name)
        #[arg(long)]
        project: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
        /// Remove all tags
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },
    /// Change only the status of a task
    Status {
        /// Task ID
        id: String,
        /// To Do, In Progress, In Review, Completed or Blocked
        status: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct TaskFields {
    /// Free-text description
    #[arg(long)]
    pub description: Option<String>,
    /// To Do, In Progress, In Review, Completed or Blocked
    #[arg(long)]
    pub status: Option<String>,
    /// Low, Medium, High or Urgent
    #[arg(long)]
    pub priority: Option<String>,
    /// Assignee name
    #[arg(long = "assign")]
    pub assigned_to: Option<String>,
    /// Due date (YYYY-MM-DD, today, tomorrow, or "none")
    #[arg(long)]
    pub due: Option<String>,
    /// Tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

impl TaskFields {
    fn push_into(&self, form: &mut FormData) {
        form.push_opt("description", self.description.as_deref());
        form.push_opt("status", self.status.as_deref());
        form.push_opt("priority", self.priority.as_deref());
        form.push_opt("assignedTo", self.assigned_to.as_deref());
        form.push_opt("dueDate", self.due.as_deref());
        for tag in &self.tags {
            form.push("tags", tag.as_str());
        }
    }
}

/// Options shared by the list commands
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Case-insensitive text matched against name/title and description
    #[arg(long)]
    pub search: Option<String>,
    /// Sort field; prefix with '-' for descending (e.g. -completion)
    #[arg(long, allow_hyphen_values = true)]
    pub sort: Option<String>,
    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<usize>,
    /// Rows per page (defaults to list.page_size)
    #[arg(long)]
    pub page_size: Option<usize>,
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    fn criteria(&self, default_page_size: usize) -> Criteria {
        let mut criteria = Criteria::default()
            .with_page(self.page.unwrap_or(1))
            .with_page_size(self.page_size.unwrap_or(default_page_size));
        if let Some(search) = &self.search {
            criteria = criteria.with_search(search.as_str());
        }
        if let Some(sort) = &self.sort {
            criteria = criteria.with_sort(SortSpec::parse(sort));
        }
        criteria
    }
}

#[derive(Subcommand)]
pub enum ServiceCommands {
    /// Define a service
    Add {
        /// Service name
        name: String,
        /// Hex colour, e.g. #10B981 (default #3B82F6)
        #[arg(long)]
        color: Option<String>,
    },
    /// List services
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Delete a service
    Delete {
        /// Service id or name
        service: String,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user
    Add {
        /// Email address (unique)
        email: String,
        /// Display name
        username: String,
        /// Avatar image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// List users
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum CurrentCommands {
    /// Make a project the current one
    Set {
        /// Project id or name
        project: String,
    },
    /// Show the current project
    Show {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Unset the current project
    Clear,
}

/// Initialise `env_logger`; `RUST_LOG` overrides the default `warn` level
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("warn");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    handle_command(cli)
}

fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Projects { subcommand } => handle_projects(subcommand),
        Commands::Tasks { subcommand } => handle_tasks(subcommand),
        Commands::Services { subcommand } => handle_services(subcommand),
        Commands::Users { subcommand } => handle_users(subcommand),
        Commands::Current { subcommand } => handle_current(subcommand),
        Commands::Status { json } => handle_status(json),
    }
}

/// Open database plus loaded configuration for one command
struct Workspace {
    conn: Connection,
    config: Config,
}

impl Workspace {
    fn open() -> Result<Self> {
        let config = Config::load()?;
        let path = config.database_path()?;
        let conn = DbConnection::connect_at(&path)
            .context("Failed to connect to database")?;
        Ok(Self { conn, config })
    }

    /// Owner configured with `user.email`, if any
    fn owner_id(&self) -> Result<Option<i64>> {
        let Some(email) = &self.config.user_email else {
            return Ok(None);
        };
        let user = UserRepo::get_by_email(&self.conn, email)?.ok_or_else(|| {
            Error::validation(format!(
                "User '{}' not found. To add: taskdeck users add {} <username>",
                email, email
            ))
        })?;
        Ok(user.id)
    }

    fn projects(&self) -> Result<Vec<Project>> {
        ProjectRepo::list(&self.conn, self.owner_id()?).context("Failed to list projects")
    }

    /// Tasks belonging to the visible projects
    fn tasks(&self, projects: &[Project]) -> Result<Vec<Task>> {
        let tasks = if self.config.user_email.is_some() {
            let ids: Vec<i64> = projects.iter().filter_map(|p| p.id).collect();
            TaskRepo::list(&self.conn, Some(ids.as_slice()))
        } else {
            TaskRepo::list(&self.conn, None)
        };
        tasks.context("Failed to list tasks")
    }

    fn project(&self, reference: &str) -> Result<Project> {
        let projects = self.projects()?;
        Ok(resolve_project(reference, &projects)?)
    }

    /// Parse a task id; with an owner configured the task must sit in one of
    /// the owner's projects
    fn task_id(&self, id: &str) -> Result<i64> {
        let task_id = validate_id(id, "Task")?;
        if self.config.user_email.is_none() {
            return Ok(task_id);
        }
        let Some(task) = TaskRepo::get_by_id(&self.conn, task_id)? else {
            return Ok(task_id);
        };
        if self.projects()?.iter().any(|p| p.id == Some(task.project_id)) {
            Ok(task_id)
        } else {
            Err(Error::NotFound("Task").into())
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_projects(cmd: ProjectCommands) -> Result<()> {
    let ws = Workspace::open()?;

    match cmd {
        ProjectCommands::Add { name, fields } => {
            validate_non_empty(&name, "Project name")?;
            let mut form = FormData::new().with("name", name.as_str());
            fields.push_into(&mut form);

            let id = actions::add_project(&ws.conn, &form, ws.owner_id()?).into_result()?;
            println!("Created project {}: {}", id.unwrap_or_default(), name.trim());
            Ok(())
        }
        ProjectCommands::List { status, tag, priority, list: args } => {
            let projects = ws.projects()?;
            let mut criteria = args.criteria(ws.config.page_size);
            for (field, value) in [("status", status), ("tag", tag), ("priority", priority)] {
                if let Some(value) = value {
                    criteria = criteria.with_filter(field, value);
                }
            }

            let view = list::apply(&projects, &criteria);
            let facets = list::facets(&projects);
            if args.json {
                print_json(&serde_json::json!({
                    "page": view.page,
                    "page_size": view.page_size,
                    "total_pages": view.total_pages,
                    "total_count": view.total_count,
                    "items": view.items,
                    "facets": facets,
                }))
            } else {
                println!("{}", format_project_list(&view, &facets, RenderOptions::detect()));
                Ok(())
            }
        }
        ProjectCommands::Show { project, json } => {
            let project = ws.project(&project)?;
            let project_id = project.id.unwrap_or_default();
            let tasks = TaskRepo::list(&ws.conn, Some(std::slice::from_ref(&project_id)))?;
            let is_current = CurrentRepo::resolve(&ws.conn)?
                .project()
                .is_some_and(|current| current.id == project.id);

            if json {
                print_json(&serde_json::json!({
                    "project": project,
                    "tasks": tasks,
                    "is_current": is_current,
                }))
            } else {
                println!("{}", format_project_detail(&project, &tasks, is_current));
                Ok(())
            }
        }
        ProjectCommands::Modify { project, name, fields, clear_tags } => {
            let project = ws.project(&project)?;
            let project_id = project.id.unwrap_or_default();

            let mut form = FormData::new();
            form.push_opt("name", name.as_deref());
            fields.push_into(&mut form);
            if clear_tags {
                form.push("tags", "");
            }

            actions::update_project(&ws.conn, project_id, &form).into_result()?;
            println!("Modified project {}", project_id);
            Ok(())
        }
        ProjectCommands::Delete { project } => {
            let project = ws.project(&project)?;
            let project_id = project.id.unwrap_or_default();
            actions::delete_project(&ws.conn, project_id).into_result()?;
            println!("Deleted project {}: {}", project_id, project.name);
            Ok(())
        }
    }
}

fn handle_tasks(cmd: TaskCommands) -> Result<()> {
    let ws = Workspace::open()?;

    match cmd {
        TaskCommands::Add { title, project, fields } => {
            validate_non_empty(&title, "Task title")?;
            let project = ws.project(&project)?;
            let mut form = FormData::new()
                .with("projectId", project.id.unwrap_or_default().to_string())
                .with("title", title.as_str());
            fields.push_into(&mut form);

            let id = actions::add_task(&ws.conn, &form).into_result()?;
            println!("Created task {} in project '{}'", id.unwrap_or_default(), project.name);
            Ok(())
        }
        TaskCommands::List { project, status, priority, assignee, tag, list: args } => {
            let projects = ws.projects()?;
            let tasks = ws.tasks(&projects)?;

            let mut criteria = args.criteria(ws.config.page_size);
            if let Some(reference) = project {
                let project = resolve_project(&reference, &projects)?;
                criteria = criteria.with_filter("project", project.id.unwrap_or_default().to_string());
            }
            for (field, value) in [("status", status), ("priority", priority), ("assignee", assignee), ("tag", tag)] {
                if let Some(value) = value {
                    criteria = criteria.with_filter(field, value);
                }
            }

            let view = list::apply(&tasks, &criteria);
            if args.json {
                print_json(&serde_json::json!({
                    "page": view.page,
                    "page_size": view.page_size,
                    "total_pages": view.total_pages,
                    "total_count": view.total_count,
                    "items": view.items,
                    "facets": list::facets(&tasks),
                }))
            } else {
                let names: HashMap<i64, String> = projects
                    .iter()
                    .filter_map(|p| p.id.map(|id| (id, p.name.clone())))
                    .collect();
                let now = chrono::Utc::now().timestamp();
                println!("{}", format_task_list(&view, &names, now, RenderOptions::detect()));
                Ok(())
            }
        }
        TaskCommands::Modify { id, title, project, fields, clear_tags } => {
            let task_id = ws.task_id(&id)?;
            let mut form = FormData::new();
            form.push_opt("title", title.as_deref());
            if let Some(reference) = project {
                let project = ws.project(&reference)?;
                form.push("projectId", project.id.unwrap_or_default().to_string());
            }
            fields.push_into(&mut form);
            if clear_tags {
                form.push("tags", "");
            }

            actions::update_task(&ws.conn, task_id, &form).into_result()?;
            println!("Modified task {}", task_id);
            Ok(())
        }
        TaskCommands::Status { id, status } => {
            let task_id = ws.task_id(&id)?;
            let form = FormData::new()
                .with("id", task_id.to_string())
                .with("status", status.as_str());
            actions::update_task_status(&ws.conn, &form).into_result()?;
            println!("Task {} is now {}", task_id, status.trim());
            Ok(())
        }
        TaskCommands::Delete { id } => {
            let task_id = ws.task_id(&id)?;
            actions::delete_task(&ws.conn, task_id).into_result()?;
            println!("Deleted task {}", task_id);
            Ok(())
        }
    }
}

fn handle_services(cmd: ServiceCommands) -> Result<()> {
    let ws = Workspace::open()?;
    let owner_id = ws.owner_id()?;

    match cmd {
        ServiceCommands::Add { name, color } => {
            let mut form = FormData::new().with("name", name.as_str());
            form.push_opt("color", color.as_deref());
            let id = actions::add_service(&ws.conn, &form, owner_id).into_result()?;
            println!("Created service {}: {}", id.unwrap_or_default(), name.trim());
            Ok(())
        }
        ServiceCommands::List { json } => {
            let services = ServiceRepo::list(&ws.conn, owner_id)?;
            if json {
                print_json(&services)
            } else {
                let options = RenderOptions::detect();
                println!("{}", format_service_list(&services, options));
                Ok(())
            }
        }
        ServiceCommands::Delete { service } => {
            validate_non_empty(&service, "Service")?;
            let found = match service.trim().parse::<i64>() {
                Ok(id) => ServiceRepo::get_by_id(&ws.conn, id)?.filter(|s| s.owner_id == owner_id),
                Err(_) => ServiceRepo::get_by_name(&ws.conn, &service, owner_id)?,
            };
            let Some(found) = found else {
                let services = ServiceRepo::list(&ws.conn, owner_id)?;
                let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
                return Err(not_found_with_suggestions("Service", service.trim(), &names).into());
            };

            let service_id = found.id.unwrap_or_default();
            actions::delete_service(&ws.conn, service_id).into_result()?;
            println!("Deleted service {}: {}", service_id, found.name);
            Ok(())
        }
    }
}

fn handle_users(cmd: UserCommands) -> Result<()> {
    let ws = Workspace::open()?;

    match cmd {
        UserCommands::Add { email, username, image } => {
            let user = UserRepo::create(&ws.conn, &email, &username, image.as_deref())?;
            println!("Created user {}: {} <{}>", user.id.unwrap_or_default(), user.username, user.email);
            Ok(())
        }
        UserCommands::List { json } => {
            let users = UserRepo::list(&ws.conn)?;
            if json {
                print_json(&users)
            } else {
                println!("{}", format_user_list(&users));
                Ok(())
            }
        }
    }
}

fn handle_current(cmd: CurrentCommands) -> Result<()> {
    let ws = Workspace::open()?;

    match cmd {
        CurrentCommands::Set { project } => {
            let project = ws.project(&project)?;
            let project_id = project.id.unwrap_or_default();
            let form = FormData::new()
                .with("name", project.name.as_str())
                .with("project_id", project_id.to_string());
            actions::update_current(&ws.conn, &form).into_result()?;
            println!("Current project set to '{}' (id {})", project.name, project_id);
            Ok(())
        }
        CurrentCommands::Show { json } => {
            let selection = CurrentRepo::resolve(&ws.conn)?;
            if json {
                print_json(&selection_json(&selection))
            } else {
                println!("{}", format_selection(&selection));
                Ok(())
            }
        }
        CurrentCommands::Clear => {
            if CurrentRepo::clear(&ws.conn)? {
                println!("Cleared current project");
            } else {
                println!("No project selected.");
            }
            Ok(())
        }
    }
}

fn selection_json(selection: &Selection) -> serde_json::Value {
    match selection {
        Selection::None => serde_json::Value::Null,
        Selection::Stale(current) => serde_json::json!({
            "name": current.name,
            "project_id": current.project_id,
            "stale": true,
        }),
        Selection::Active { current, .. } => serde_json::json!({
            "name": current.name,
            "project_id": current.project_id,
            "stale": false,
        }),
    }
}

fn handle_status(json: bool) -> Result<()> {
    let ws = Workspace::open()?;

    let projects = ws.projects()?;
    let tasks = ws.tasks(&projects)?;
    let services = ServiceRepo::list(&ws.conn, ws.owner_id()?)?;
    let selection = CurrentRepo::resolve(&ws.conn)?;
    let stats = DashboardStats::compute(&projects, &tasks, services.len(), chrono::Utc::now().timestamp());

    if json {
        print_json(&serde_json::json!({
            "stats": stats,
            "current": selection_json(&selection),
        }))
    } else {
        println!("{}", format_dashboard(&stats, &selection, RenderOptions::detect().tty));
        Ok(())
    }
}
