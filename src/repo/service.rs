use rusqlite::{Connection, OptionalExtension, Row};
use crate::error::Error;
use crate::forms::ServiceDraft;
use crate::models::Service;
use anyhow::{Context, Result};

/// Service repository for database operations
pub struct ServiceRepo;

impl ServiceRepo {
    /// Create a service. Names are unique per owner (case-insensitive).
    pub fn create(conn: &Connection, draft: &ServiceDraft, owner_id: Option<i64>) -> Result<Service> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(Error::validation("Service name is required").into());
        }
        if Self::get_by_name(conn, name, owner_id)?.is_some() {
            return Err(Error::validation(format!("Service '{}' already exists", name)).into());
        }

        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO services (name, color, owner_id, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![name, draft.color, owner_id, now, now],
        )
        .with_context(|| format!("Failed to create service: {}", name))?;

        let id = conn.last_insert_rowid();
        log::debug!("Created service {} '{}'", id, name);
        Self::get_by_id(conn, id)?.ok_or_else(|| Error::NotFound("Service").into())
    }

    /// Get service by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Service>> {
        let service = conn
            .query_row(
                "SELECT id, name, color, owner_id, created_ts, modified_ts FROM services WHERE id = ?1",
                [id],
                service_from_row,
            )
            .optional()?;
        Ok(service)
    }

    /// Find a service by name within one owner's scope
    pub fn get_by_name(conn: &Connection, name: &str, owner_id: Option<i64>) -> Result<Option<Service>> {
        let service = conn
            .query_row(
                "SELECT id, name, color, owner_id, created_ts, modified_ts FROM services
                 WHERE lower(name) = lower(?1) AND owner_id IS ?2",
                rusqlite::params![name.trim(), owner_id],
                service_from_row,
            )
            .optional()?;
        Ok(service)
    }

    /// List services of one owner in insertion order
    pub fn list(conn: &Connection, owner_id: Option<i64>) -> Result<Vec<Service>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, color, owner_id, created_ts, modified_ts FROM services
             WHERE owner_id IS ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([owner_id], service_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Delete a service
    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        let rows_affected = conn.execute("DELETE FROM services WHERE id = ?1", [id])
            .with_context(|| format!("Failed to delete service {}", id))?;

        if rows_affected == 0 {
            return Err(Error::NotFound("Service").into());
        }

        log::debug!("Deleted service {}", id);
        Ok(())
    }
}

fn service_from_row(row: &Row<'_>) -> rusqlite::Result<Service> {
    Ok(Service {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        color: row.get(2)?,
        owner_id: row.get(3)?,
        created_ts: row.get(4)?,
        modified_ts: row.get(5)?,
    })
}
