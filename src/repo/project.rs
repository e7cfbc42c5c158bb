use rusqlite::{Connection, OptionalExtension, Row};
use crate::error::Error;
use crate::forms::ProjectDraft;
use crate::models::{Project, ProjectPriority, ProjectStatus};
use crate::repo::tags::{self, TagTable};
use anyhow::{Context, Result};

const PROJECT_COLUMNS: &str = "id, name, description, status, priority, completion, start_ts, \
     target_end_ts, actual_end_ts, git_repo, domain, owner_id, created_ts, modified_ts";

/// Project repository for database operations
///
/// Projects are listed in insertion order; any ordering shown to the user is
/// applied afterwards by the list engine. Deleting a project removes its tasks
/// in the same transaction.
///
/// # Example
///
/// ```no_run
/// use taskdeck::db::DbConnection;
/// use taskdeck::forms::{FormData, ProjectDraft};
/// use taskdeck::repo::ProjectRepo;
///
/// let conn = DbConnection::connect_at(std::path::Path::new("deck.db")).unwrap();
/// let draft = ProjectDraft::from_form(&FormData::new().with("name", "Redesign Site")).unwrap();
/// let project = ProjectRepo::create(&conn, &draft, None).unwrap();
/// ```
pub struct ProjectRepo;

impl ProjectRepo {
    /// Create a new project
    pub fn create(conn: &Connection, draft: &ProjectDraft, owner_id: Option<i64>) -> Result<Project> {
        draft.validate()?;
        let now = chrono::Utc::now().timestamp();
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO projects (name, description, status, priority, completion, start_ts,
                    target_end_ts, actual_end_ts, git_repo, domain, owner_id, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            rusqlite::params![
                draft.name.trim(),
                draft.description.trim(),
                draft.status.as_str(),
                draft.priority.as_str(),
                draft.completion,
                draft.start_ts,
                draft.target_end_ts,
                draft.actual_end_ts,
                draft.git_repo,
                draft.domain,
                owner_id,
                now,
                now
            ],
        )
        .with_context(|| format!("Failed to create project: {}", draft.name))?;

        let id = tx.last_insert_rowid();
        tags::replace_tags(&tx, TagTable::Project, id, &draft.tags)?;
        tx.commit()?;

        log::debug!("Created project {} '{}'", id, draft.name);
        Self::get_by_id(conn, id)?.ok_or_else(|| Error::NotFound("Project").into())
    }

    /// Get project by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Project>> {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS))?;
        let project = stmt.query_row([id], project_from_row).optional()?.flatten();

        match project {
            Some(mut project) => {
                project.tags = tags::get_tags(conn, TagTable::Project, id)?;
                Ok(Some(project))
            }
            None => Ok(None),
        }
    }

    /// List projects in insertion order, optionally only those of one owner
    pub fn list(conn: &Connection, owner_id: Option<i64>) -> Result<Vec<Project>> {
        let mut all_tags = tags::all_tags(conn, TagTable::Project)?;

        let mut stmt;
        let rows = match owner_id {
            Some(owner) => {
                stmt = conn.prepare(&format!(
                    "SELECT {} FROM projects WHERE owner_id = ?1 ORDER BY id",
                    PROJECT_COLUMNS
                ))?;
                stmt.query_map([owner], project_from_row)?
            }
            None => {
                stmt = conn.prepare(&format!("SELECT {} FROM projects ORDER BY id", PROJECT_COLUMNS))?;
                stmt.query_map([], project_from_row)?
            }
        };

        let mut projects = Vec::new();
        for row in rows {
            if let Some(mut project) = row? {
                if let Some(id) = project.id {
                    project.tags = all_tags.remove(&id).unwrap_or_default();
                }
                projects.push(project);
            }
        }
        Ok(projects)
    }

    /// Replace every editable field of a project
    pub fn update(conn: &Connection, id: i64, draft: &ProjectDraft) -> Result<Project> {
        draft.validate()?;
        let now = chrono::Utc::now().timestamp();
        let tx = conn.unchecked_transaction()?;

        let rows_affected = tx.execute(
            "UPDATE projects SET name = ?1, description = ?2, status = ?3, priority = ?4,
                    completion = ?5, start_ts = ?6, target_end_ts = ?7, actual_end_ts = ?8,
                    git_repo = ?9, domain = ?10, modified_ts = ?11
             WHERE id = ?12",
            rusqlite::params![
                draft.name.trim(),
                draft.description.trim(),
                draft.status.as_str(),
                draft.priority.as_str(),
                draft.completion,
                draft.start_ts,
                draft.target_end_ts,
                draft.actual_end_ts,
                draft.git_repo,
                draft.domain,
                now,
                id
            ],
        )
        .with_context(|| format!("Failed to update project {}", id))?;

        if rows_affected == 0 {
            return Err(Error::NotFound("Project").into());
        }

        tags::replace_tags(&tx, TagTable::Project, id, &draft.tags)?;
        tx.commit()?;

        log::debug!("Updated project {}", id);
        Self::get_by_id(conn, id)?.ok_or_else(|| Error::NotFound("Project").into())
    }

    /// Delete a project and all of its tasks. Returns the number of tasks removed.
    pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
        let tx = conn.unchecked_transaction()?;

        let tasks_deleted = tx.execute("DELETE FROM tasks WHERE project_id = ?1", [id])
            .with_context(|| format!("Failed to delete tasks of project {}", id))?;
        let rows_affected = tx.execute("DELETE FROM projects WHERE id = ?1", [id])
            .with_context(|| format!("Failed to delete project {}", id))?;

        if rows_affected == 0 {
            // Dropping the transaction rolls back the task delete
            return Err(Error::NotFound("Project").into());
        }

        tx.commit()?;
        log::debug!("Deleted project {} and {} task(s)", id, tasks_deleted);
        Ok(tasks_deleted)
    }

    /// Whether a project with this id exists
    pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM projects WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }
}

/// Map a row; rows with unrecognised status/priority labels are skipped
fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Option<Project>> {
    let id: i64 = row.get(0)?;
    let status_label: String = row.get(3)?;
    let priority_label: String = row.get(4)?;

    let (Some(status), Some(priority)) = (
        ProjectStatus::from_str(&status_label),
        ProjectPriority::from_str(&priority_label),
    ) else {
        log::warn!(
            "Skipping project {}: unrecognised status '{}' or priority '{}'",
            id, status_label, priority_label
        );
        return Ok(None);
    };

    Ok(Some(Project {
        id: Some(id),
        name: row.get(1)?,
        description: row.get(2)?,
        status,
        priority,
        completion: row.get::<_, i64>(5)?.clamp(0, 100) as u8,
        tags: Vec::new(),
        start_ts: row.get(6)?,
        target_end_ts: row.get(7)?,
        actual_end_ts: row.get(8)?,
        git_repo: row.get(9)?,
        domain: row.get(10)?,
        owner_id: row.get(11)?,
        created_ts: row.get(12)?,
        modified_ts: row.get(13)?,
    }))
}
