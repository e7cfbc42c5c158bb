use rusqlite::{Connection, OptionalExtension, Row};
use crate::error::Error;
use crate::forms::TaskDraft;
use crate::models::{Task, TaskPriority, TaskStatus};
use crate::repo::ProjectRepo;
use crate::repo::tags::{self, TagTable};
use anyhow::{Context, Result};

const TASK_COLUMNS: &str = "id, project_id, title, description, status, priority, assigned_to, \
     due_ts, created_ts, modified_ts";

/// Task repository for database operations
pub struct TaskRepo;

impl TaskRepo {
    /// Create a new task. The referenced project must exist.
    pub fn create(conn: &Connection, draft: &TaskDraft) -> Result<Task> {
        draft.validate()?;
        if !ProjectRepo::exists(conn, draft.project_id)? {
            return Err(Error::NotFound("Project").into());
        }

        let now = chrono::Utc::now().timestamp();
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO tasks (project_id, title, description, status, priority, assigned_to,
                    due_ts, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                draft.project_id,
                draft.title.trim(),
                draft.description.trim(),
                draft.status.as_str(),
                draft.priority.as_str(),
                draft.assigned_to,
                draft.due_ts,
                now,
                now
            ],
        )
        .with_context(|| format!("Failed to create task: {}", draft.title))?;

        let id = tx.last_insert_rowid();
        tags::replace_tags(&tx, TagTable::Task, id, &draft.tags)?;
        tx.commit()?;

        log::debug!("Created task {} in project {}", id, draft.project_id);
        Self::get_by_id(conn, id)?.ok_or_else(|| Error::NotFound("Task").into())
    }

    /// Get task by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Task>> {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS))?;
        let task = stmt.query_row([id], task_from_row).optional()?.flatten();

        match task {
            Some(mut task) => {
                task.tags = tags::get_tags(conn, TagTable::Task, id)?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    /// List tasks in insertion order
    ///
    /// With `project_ids`, only tasks of those projects are returned; an empty
    /// slice yields no tasks.
    pub fn list(conn: &Connection, project_ids: Option<&[i64]>) -> Result<Vec<Task>> {
        if project_ids.is_some_and(|ids| ids.is_empty()) {
            return Ok(Vec::new());
        }

        let sql = match project_ids {
            Some(ids) => format!(
                "SELECT {} FROM tasks WHERE project_id IN ({}) ORDER BY id",
                TASK_COLUMNS,
                vec!["?"; ids.len()].join(", ")
            ),
            None => format!("SELECT {} FROM tasks ORDER BY id", TASK_COLUMNS),
        };

        let mut all_tags = tags::all_tags(conn, TagTable::Task)?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(project_ids.unwrap_or_default()),
            task_from_row,
        )?;

        let mut tasks = Vec::new();
        for row in rows {
            if let Some(mut task) = row? {
                if let Some(id) = task.id {
                    task.tags = all_tags.remove(&id).unwrap_or_default();
                }
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    /// Replace every editable field of a task
    pub fn update(conn: &Connection, id: i64, draft: &TaskDraft) -> Result<Task> {
        draft.validate()?;
        if !ProjectRepo::exists(conn, draft.project_id)? {
            return Err(Error::NotFound("Project").into());
        }

        let now = chrono::Utc::now().timestamp();
        let tx = conn.unchecked_transaction()?;
        let rows_affected = tx.execute(
            "UPDATE tasks SET project_id = ?1, title = ?2, description = ?3, status = ?4,
                    priority = ?5, assigned_to = ?6, due_ts = ?7, modified_ts = ?8
             WHERE id = ?9",
            rusqlite::params![
                draft.project_id,
                draft.title.trim(),
                draft.description.trim(),
                draft.status.as_str(),
                draft.priority.as_str(),
                draft.assigned_to,
                draft.due_ts,
                now,
                id
            ],
        )
        .with_context(|| format!("Failed to update task {}", id))?;

        if rows_affected == 0 {
            return Err(Error::NotFound("Task").into());
        }

        tags::replace_tags(&tx, TagTable::Task, id, &draft.tags)?;
        tx.commit()?;

        log::debug!("Updated task {}", id);
        Self::get_by_id(conn, id)?.ok_or_else(|| Error::NotFound("Task").into())
    }

    /// Change only the status of a task
    pub fn update_status(conn: &Connection, id: i64, status: TaskStatus) -> Result<Task> {
        let now = chrono::Utc::now().timestamp();
        let rows_affected = conn.execute(
            "UPDATE tasks SET status = ?1, modified_ts = ?2 WHERE id = ?3",
            rusqlite::params![status.as_str(), now, id],
        )
        .with_context(|| format!("Failed to update status of task {}", id))?;

        if rows_affected == 0 {
            return Err(Error::NotFound("Task").into());
        }

        log::debug!("Task {} status -> {}", id, status.as_str());
        Self::get_by_id(conn, id)?.ok_or_else(|| Error::NotFound("Task").into())
    }

    /// Delete a task
    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        let rows_affected = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])
            .with_context(|| format!("Failed to delete task {}", id))?;

        if rows_affected == 0 {
            return Err(Error::NotFound("Task").into());
        }

        log::debug!("Deleted task {}", id);
        Ok(())
    }
}

/// Map a row; rows with unrecognised status/priority labels are skipped
fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Option<Task>> {
    let id: i64 = row.get(0)?;
    let status_label: String = row.get(4)?;
    let priority_label: String = row.get(5)?;

    let (Some(status), Some(priority)) = (
        TaskStatus::from_str(&status_label),
        TaskPriority::from_str(&priority_label),
    ) else {
        log::warn!(
            "Skipping task {}: unrecognised status '{}' or priority '{}'",
            id, status_label, priority_label
        );
        return Ok(None);
    };

    Ok(Some(Task {
        id: Some(id),
        project_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status,
        priority,
        assigned_to: row.get(6)?,
        due_ts: row.get(7)?,
        tags: Vec::new(),
        created_ts: row.get(8)?,
        modified_ts: row.get(9)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::forms::{FormData, ProjectDraft};

    fn project(conn: &Connection, name: &str) -> i64 {
        let draft = ProjectDraft { name: name.to_string(), ..Default::default() };
        ProjectRepo::create(conn, &draft, None).unwrap().id.unwrap()
    }

    fn task_draft(project_id: i64, title: &str) -> TaskDraft {
        let form = FormData::new()
            .with("projectId", project_id.to_string())
            .with("title", title);
        TaskDraft::from_form(&form).unwrap()
    }

    #[test]
    fn test_create_task() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let project_id = project(&conn, "Alpha");
        let mut draft = task_draft(project_id, "Write docs");
        draft.tags = vec!["docs".to_string()];
        draft.assigned_to = Some("sam".to_string());

        let task = TaskRepo::create(&conn, &draft).unwrap();
        assert_eq!(task.project_id, project_id);
        assert_eq!(task.status, TaskStatus::ToDo);
        assert_eq!(task.tags, vec!["docs".to_string()]);
        assert_eq!(task.assigned_to.as_deref(), Some("sam"));
    }

    #[test]
    fn test_create_task_for_missing_project() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let err = TaskRepo::create(&conn, &task_draft(5, "Orphan")).unwrap_err();
        assert_eq!(err.to_string(), "Project not found");
    }

    #[test]
    fn test_list_by_project_ids() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let a = project(&conn, "A");
        let b = project(&conn, "B");
        let c = project(&conn, "C");
        TaskRepo::create(&conn, &task_draft(a, "a1")).unwrap();
        TaskRepo::create(&conn, &task_draft(b, "b1")).unwrap();
        TaskRepo::create(&conn, &task_draft(c, "c1")).unwrap();
        TaskRepo::create(&conn, &task_draft(a, "a2")).unwrap();

        let all = TaskRepo::list(&conn, None).unwrap();
        assert_eq!(all.len(), 4);

        let some = TaskRepo::list(&conn, Some(&[a, c])).unwrap();
        let titles: Vec<&str> = some.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a1", "c1", "a2"]);

        assert!(TaskRepo::list(&conn, Some(&[])).unwrap().is_empty());
    }

    #[test]
    fn test_update_status() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let project_id = project(&conn, "Alpha");
        let task = TaskRepo::create(&conn, &task_draft(project_id, "Review")).unwrap();

        let updated = TaskRepo::update_status(&conn, task.id.unwrap(), TaskStatus::InReview).unwrap();
        assert_eq!(updated.status, TaskStatus::InReview);
        assert_eq!(updated.title, "Review");

        let err = TaskRepo::update_status(&conn, 999, TaskStatus::Completed).unwrap_err();
        assert_eq!(err.to_string(), "Task not found");
    }

    #[test]
    fn test_update_task_moves_project() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let a = project(&conn, "A");
        let b = project(&conn, "B");
        let task = TaskRepo::create(&conn, &task_draft(a, "Move me")).unwrap();

        let mut edit = TaskDraft::from_task(&task);
        edit.merge_form(&FormData::new().with("projectId", b.to_string()).with("priority", "High"))
            .unwrap();
        let updated = TaskRepo::update(&conn, task.id.unwrap(), &edit).unwrap();
        assert_eq!(updated.project_id, b);
        assert_eq!(updated.priority, TaskPriority::High);
    }

    #[test]
    fn test_delete_task() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let project_id = project(&conn, "Alpha");
        let task = TaskRepo::create(&conn, &task_draft(project_id, "Temp")).unwrap();

        TaskRepo::delete(&conn, task.id.unwrap()).unwrap();
        assert!(TaskRepo::get_by_id(&conn, task.id.unwrap()).unwrap().is_none());

        let err = TaskRepo::delete(&conn, task.id.unwrap()).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotFound("Task"))));
    }
}
