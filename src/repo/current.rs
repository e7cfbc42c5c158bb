// Current-project register
//
// The current_project table holds at most one row. It has no key, so every
// write clears the table and inserts the new pointer.

use rusqlite::{Connection, OptionalExtension};
use crate::error::Error;
use crate::models::{CurrentSelection, Selection};
use crate::repo::ProjectRepo;
use anyhow::{Context, Result};

/// Repository for the single "current project" pointer
pub struct CurrentRepo;

impl CurrentRepo {
    /// Replace the pointer. Both values must be non-empty.
    ///
    /// The delete and insert share one transaction, so readers never observe
    /// an empty register between the two steps.
    pub fn set(conn: &Connection, name: &str, project_id: &str) -> Result<CurrentSelection> {
        let name = name.trim();
        let project_id = project_id.trim();
        if name.is_empty() || project_id.is_empty() {
            return Err(Error::validation("Name and project_id are required").into());
        }

        let now = chrono::Utc::now().timestamp();
        let tx = conn.unchecked_transaction()?;
        let replaced = tx.execute("DELETE FROM current_project", [])?;
        tx.execute(
            "INSERT INTO current_project (name, project_id, created_ts) VALUES (?1, ?2, ?3)",
            rusqlite::params![name, project_id, now],
        )
        .context("Failed to store current project")?;
        tx.commit()?;

        log::debug!("Current project -> '{}' ({}), replaced {} row(s)", name, project_id, replaced);
        Ok(CurrentSelection {
            name: name.to_string(),
            project_id: project_id.to_string(),
            created_ts: now,
        })
    }

    /// The stored pointer, if any
    pub fn get(conn: &Connection) -> Result<Option<CurrentSelection>> {
        let current = conn
            .query_row(
                "SELECT name, project_id, created_ts FROM current_project
                 ORDER BY rowid DESC LIMIT 1",
                [],
                |row| {
                    Ok(CurrentSelection {
                        name: row.get(0)?,
                        project_id: row.get(1)?,
                        created_ts: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(current)
    }

    /// Look the pointer up against the projects table
    ///
    /// A pointer whose project no longer exists (or whose id is not numeric)
    /// resolves to `Selection::Stale` rather than an error.
    pub fn resolve(conn: &Connection) -> Result<Selection> {
        let Some(current) = Self::get(conn)? else {
            return Ok(Selection::None);
        };

        let project = match current.project_id.parse::<i64>() {
            Ok(id) => ProjectRepo::get_by_id(conn, id)?,
            Err(_) => None,
        };

        match project {
            Some(project) => Ok(Selection::Active { current, project }),
            None => {
                log::debug!("Current project '{}' points at missing project {}", current.name, current.project_id);
                Ok(Selection::Stale(current))
            }
        }
    }

    /// Remove the pointer. Returns whether one was set.
    pub fn clear(conn: &Connection) -> Result<bool> {
        let removed = conn.execute("DELETE FROM current_project", [])?;
        Ok(removed > 0)
    }
}
