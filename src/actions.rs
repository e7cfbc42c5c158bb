//! Write actions
//!
//! Each action maps a submitted form onto a repository write and reports the
//! outcome as an [`ActionResult`] instead of an error. Failures are logged at
//! `error` level; nothing here panics or propagates.

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

use crate::error::Error;
use crate::forms::{parse_task_status, FormData, ProjectDraft, ServiceDraft, TaskDraft};
use crate::repo::{CurrentRepo, ProjectRepo, ServiceRepo, TaskRepo};

/// `{success, error?, id?}` outcome of a write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Id of the created or changed entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Failure came from the store rather than the submitted data
    #[serde(skip)]
    pub internal: bool,
}

impl ActionResult {
    pub fn ok(id: Option<i64>) -> Self {
        Self { success: true, error: None, id, internal: false }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()), id: None, internal: false }
    }

    /// Turn a failure back into an error: validation for bad input, a plain
    /// error for store failures
    pub fn into_result(self) -> Result<Option<i64>> {
        if self.success {
            return Ok(self.id);
        }
        let message = self.error.unwrap_or_else(|| "Action failed".to_string());
        if self.internal {
            Err(anyhow::anyhow!(message))
        } else {
            Err(Error::Validation(message).into())
        }
    }

    fn from_result(action: &str, result: Result<Option<i64>>) -> Self {
        match result {
            Ok(id) => Self::ok(id),
            Err(err) => {
                log::error!("{} failed: {:#}", action, err);
                Self {
                    internal: !crate::error::is_user_error(&err),
                    ..Self::failed(err.to_string())
                }
            }
        }
    }
}

pub fn add_project(conn: &Connection, form: &FormData, owner_id: Option<i64>) -> ActionResult {
    ActionResult::from_result("add_project", create_project(conn, form, owner_id))
}

/// Apply an edit form on top of the stored project
pub fn update_project(conn: &Connection, id: i64, form: &FormData) -> ActionResult {
    ActionResult::from_result("update_project", edit_project(conn, id, form))
}

/// Delete a project together with its tasks
pub fn delete_project(conn: &Connection, id: i64) -> ActionResult {
    ActionResult::from_result("delete_project", ProjectRepo::delete(conn, id).map(|_| Some(id)))
}

pub fn add_task(conn: &Connection, form: &FormData) -> ActionResult {
    ActionResult::from_result("add_task", create_task(conn, form))
}

pub fn update_task(conn: &Connection, id: i64, form: &FormData) -> ActionResult {
    ActionResult::from_result("update_task", edit_task(conn, id, form))
}

/// Status-only update; form fields `id` and `status`
pub fn update_task_status(conn: &Connection, form: &FormData) -> ActionResult {
    ActionResult::from_result("update_task_status", set_task_status(conn, form))
}

pub fn delete_task(conn: &Connection, id: i64) -> ActionResult {
    ActionResult::from_result("delete_task", TaskRepo::delete(conn, id).map(|_| Some(id)))
}

pub fn add_service(conn: &Connection, form: &FormData, owner_id: Option<i64>) -> ActionResult {
    ActionResult::from_result("add_service", create_service(conn, form, owner_id))
}

pub fn delete_service(conn: &Connection, id: i64) -> ActionResult {
    ActionResult::from_result("delete_service", ServiceRepo::delete(conn, id).map(|_| Some(id)))
}

/// Replace the current project; form fields `name` and `project_id`
pub fn update_current(conn: &Connection, form: &FormData) -> ActionResult {
    ActionResult::from_result("update_current", set_current(conn, form))
}

fn create_project(conn: &Connection, form: &FormData, owner_id: Option<i64>) -> Result<Option<i64>> {
    let draft = ProjectDraft::from_form(form)?;
    Ok(ProjectRepo::create(conn, &draft, owner_id)?.id)
}

fn edit_project(conn: &Connection, id: i64, form: &FormData) -> Result<Option<i64>> {
    let project = ProjectRepo::get_by_id(conn, id)?.ok_or(Error::NotFound("Project"))?;
    let mut draft = ProjectDraft::from_project(&project);
    draft.merge_form(form)?;
    Ok(ProjectRepo::update(conn, id, &draft)?.id)
}

fn create_task(conn: &Connection, form: &FormData) -> Result<Option<i64>> {
    let draft = TaskDraft::from_form(form)?;
    Ok(TaskRepo::create(conn, &draft)?.id)
}

fn edit_task(conn: &Connection, id: i64, form: &FormData) -> Result<Option<i64>> {
    let task = TaskRepo::get_by_id(conn, id)?.ok_or(Error::NotFound("Task"))?;
    let mut draft = TaskDraft::from_task(&task);
    draft.merge_form(form)?;
    Ok(TaskRepo::update(conn, id, &draft)?.id)
}

fn set_task_status(conn: &Connection, form: &FormData) -> Result<Option<i64>> {
    let id = form
        .get("id")
        .ok_or_else(|| Error::validation("Task ID is required"))?
        .parse::<i64>()
        .map_err(|_| Error::validation("Task ID must be a number"))?;
    let status = parse_task_status(form.get("status").unwrap_or_default())?;
    Ok(TaskRepo::update_status(conn, id, status)?.id)
}

fn create_service(conn: &Connection, form: &FormData, owner_id: Option<i64>) -> Result<Option<i64>> {
    let draft = ServiceDraft::from_form(form)?;
    Ok(ServiceRepo::create(conn, &draft, owner_id)?.id)
}

fn set_current(conn: &Connection, form: &FormData) -> Result<Option<i64>> {
    let name = form.get("name").unwrap_or_default();
    let project_id = form.get("project_id").unwrap_or_default();
    let current = CurrentRepo::set(conn, name, project_id)?;
    Ok(current.project_id.parse::<i64>().ok())
}
