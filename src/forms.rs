//! Form-to-entity mapping
//!
//! Submitted forms are lists of `(field, value)` pairs where a field may repeat
//! (`tags`). Drafts are the validated payloads handed to the repositories.
//! Field names follow the web form contract: `name`, `description`, `status`,
//! `priority`, `completion`, `tags`, `gitRepo`, `domain`, `startDate`,
//! `targetEndDate`, `actualEndDate` for projects; `title`, `projectId`,
//! `assignedTo`, `dueDate` for tasks; `name`, `color` for services.
//!
//! `merge_form` only touches fields present in the form, so an edit form can be
//! applied on top of the stored entity. Dates accept `none` to clear them.

use crate::error::Error;
use crate::models::{
    is_hex_color, Project, ProjectPriority, ProjectStatus, Task, TaskPriority, TaskStatus,
    DEFAULT_SERVICE_COLOR,
};
use crate::utils::parse_date_expr;

/// Multi-valued form fields in submission order
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Builder-style `push`
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Push only when a value is present
    pub fn push_opt(&mut self, name: &str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.push(name, value);
        }
    }

    /// Whether the field was submitted at all (even empty)
    pub fn has(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// First value of a field, trimmed; empty values count as absent
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Every non-empty value of a repeated field, trimmed
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Validated project payload
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: ProjectPriority,
    pub completion: u8,
    pub tags: Vec<String>,
    pub start_ts: Option<i64>,
    pub target_end_ts: Option<i64>,
    pub actual_end_ts: Option<i64>,
    pub git_repo: Option<String>,
    pub domain: Option<String>,
}

impl Default for ProjectDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            status: ProjectStatus::Planning,
            priority: ProjectPriority::Medium,
            completion: 0,
            tags: Vec::new(),
            start_ts: None,
            target_end_ts: None,
            actual_end_ts: None,
            git_repo: None,
            domain: None,
        }
    }
}

impl ProjectDraft {
    /// Map a creation form, applying defaults
    pub fn from_form(form: &FormData) -> Result<Self, Error> {
        let mut draft = Self::default();
        draft.merge_form(form)?;
        draft.validate()?;
        Ok(draft)
    }

    /// Start an edit from the stored project
    pub fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone(),
            status: project.status,
            priority: project.priority,
            completion: project.completion,
            tags: project.tags.clone(),
            start_ts: project.start_ts,
            target_end_ts: project.target_end_ts,
            actual_end_ts: project.actual_end_ts,
            git_repo: project.git_repo.clone(),
            domain: project.domain.clone(),
        }
    }

    /// Overwrite the fields present in `form`
    pub fn merge_form(&mut self, form: &FormData) -> Result<(), Error> {
        if form.has("name") {
            self.name = form.get("name").unwrap_or_default().to_string();
        }
        if form.has("description") {
            self.description = form.get("description").unwrap_or_default().to_string();
        }
        if let Some(value) = form.get("status") {
            self.status = ProjectStatus::from_str(value)
                .ok_or_else(|| invalid_choice("status", value, ProjectStatus::ALL.map(|s| s.as_str())))?;
        }
        if let Some(value) = form.get("priority") {
            self.priority = ProjectPriority::from_str(value)
                .ok_or_else(|| invalid_choice("priority", value, ProjectPriority::ALL.map(|p| p.as_str())))?;
        }
        if let Some(value) = form.get("completion") {
            self.completion = parse_completion(value)?;
        }
        if form.has("tags") {
            self.tags = normalize_tags(&form.get_all("tags"));
        }
        merge_date(form, "startDate", &mut self.start_ts)?;
        merge_date(form, "targetEndDate", &mut self.target_end_ts)?;
        merge_date(form, "actualEndDate", &mut self.actual_end_ts)?;
        merge_text(form, "gitRepo", &mut self.git_repo);
        merge_text(form, "domain", &mut self.domain);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Project name is required"));
        }
        if self.completion > 100 {
            return Err(Error::validation("Completion must be between 0 and 100"));
        }
        Ok(())
    }
}

/// Validated task payload
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub project_id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assigned_to: Option<String>,
    pub due_ts: Option<i64>,
    pub tags: Vec<String>,
}

impl TaskDraft {
    /// Map a creation form; `projectId` and `title` are required
    pub fn from_form(form: &FormData) -> Result<Self, Error> {
        let project_id = match form.get("projectId") {
            Some(value) => parse_id("projectId", value)?,
            None => return Err(Error::validation("Project id is required")),
        };
        let mut draft = Self {
            project_id,
            title: String::new(),
            description: String::new(),
            status: TaskStatus::ToDo,
            priority: TaskPriority::Medium,
            assigned_to: None,
            due_ts: None,
            tags: Vec::new(),
        };
        draft.merge_form(form)?;
        draft.validate()?;
        Ok(draft)
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            project_id: task.project_id,
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            assigned_to: task.assigned_to.clone(),
            due_ts: task.due_ts,
            tags: task.tags.clone(),
        }
    }

    pub fn merge_form(&mut self, form: &FormData) -> Result<(), Error> {
        if let Some(value) = form.get("projectId") {
            self.project_id = parse_id("projectId", value)?;
        }
        if form.has("title") {
            self.title = form.get("title").unwrap_or_default().to_string();
        }
        if form.has("description") {
            self.description = form.get("description").unwrap_or_default().to_string();
        }
        if let Some(value) = form.get("status") {
            self.status = parse_task_status(value)?;
        }
        if let Some(value) = form.get("priority") {
            self.priority = TaskPriority::from_str(value)
                .ok_or_else(|| invalid_choice("priority", value, TaskPriority::ALL.map(|p| p.as_str())))?;
        }
        merge_text(form, "assignedTo", &mut self.assigned_to);
        merge_date(form, "dueDate", &mut self.due_ts)?;
        if form.has("tags") {
            self.tags = normalize_tags(&form.get_all("tags"));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("Task title is required"));
        }
        Ok(())
    }
}

/// Validated service payload
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDraft {
    pub name: String,
    pub color: String,
}

impl ServiceDraft {
    pub fn from_form(form: &FormData) -> Result<Self, Error> {
        let name = form.get("name")
            .ok_or_else(|| Error::validation("Service name is required"))?;
        let color = form.get("color").unwrap_or(DEFAULT_SERVICE_COLOR);
        if !is_hex_color(color) {
            return Err(Error::validation(format!(
                "Invalid color '{}'. Use a hex color such as {}.",
                color, DEFAULT_SERVICE_COLOR
            )));
        }
        Ok(Self {
            name: name.to_string(),
            color: color.to_string(),
        })
    }
}

/// Parse a task status against the five recognised values
pub fn parse_task_status(value: &str) -> Result<TaskStatus, Error> {
    TaskStatus::from_str(value)
        .ok_or_else(|| invalid_choice("status", value, TaskStatus::ALL.map(|s| s.as_str())))
}

fn invalid_choice<const N: usize>(field: &str, value: &str, allowed: [&str; N]) -> Error {
    Error::validation(format!(
        "Invalid {} '{}'. Expected one of: {}",
        field,
        value,
        allowed.join(", ")
    ))
}

fn parse_id(field: &str, value: &str) -> Result<i64, Error> {
    match value.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(Error::validation(format!("Invalid {} '{}'", field, value))),
    }
}

fn parse_completion(value: &str) -> Result<u8, Error> {
    match value.parse::<i64>() {
        Ok(n) if (0..=100).contains(&n) => Ok(n as u8),
        _ => Err(Error::validation(format!(
            "Invalid completion '{}'. Must be an integer from 0 to 100.",
            value
        ))),
    }
}

fn merge_date(form: &FormData, field: &str, slot: &mut Option<i64>) -> Result<(), Error> {
    if !form.has(field) {
        return Ok(());
    }
    *slot = match form.get(field) {
        None => None,
        Some(value) if value.eq_ignore_ascii_case("none") => None,
        Some(value) => Some(
            parse_date_expr(value)
                .map_err(|e| Error::validation(format!("Invalid {}: {}", field, e)))?,
        ),
    };
    Ok(())
}

fn merge_text(form: &FormData, field: &str, slot: &mut Option<String>) {
    if form.has(field) {
        *slot = form.get(field).map(str::to_string);
    }
}

/// Trim, drop empties and duplicates; first occurrence wins
fn normalize_tags(values: &[&str]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for value in values {
        for tag in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
    }
    tags
}
