use rusqlite::{Connection, OptionalExtension, Row};
use crate::error::Error;
use crate::models::User;
use anyhow::{Context, Result};

/// User repository. Only owner records are stored; there is no authentication.
pub struct UserRepo;

impl UserRepo {
    /// Register a user. Email must be unique.
    pub fn create(conn: &Connection, email: &str, username: &str, image: Option<&str>) -> Result<User> {
        let email = email.trim();
        let username = username.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::validation(format!("Invalid email '{}'", email)).into());
        }
        if username.is_empty() {
            return Err(Error::validation("Username is required").into());
        }
        if Self::get_by_email(conn, email)?.is_some() {
            return Err(Error::validation("Email already exists").into());
        }

        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO users (email, username, image, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![email, username, image, now, now],
        )
        .with_context(|| format!("Failed to create user: {}", email))?;

        let id = conn.last_insert_rowid();
        log::debug!("Created user {} <{}>", id, email);
        Self::get_by_id(conn, id)?.ok_or_else(|| Error::NotFound("User").into())
    }

    /// Get user by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
        let user = conn
            .query_row(
                "SELECT id, email, username, image, created_ts, modified_ts FROM users WHERE id = ?1",
                [id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Get user by email (case-insensitive)
    pub fn get_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
        let user = conn
            .query_row(
                "SELECT id, email, username, image, created_ts, modified_ts FROM users
                 WHERE lower(email) = lower(?1)",
                [email.trim()],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// List all users
    pub fn list(conn: &Connection) -> Result<Vec<User>> {
        let mut stmt = conn.prepare(
            "SELECT id, email, username, image, created_ts, modified_ts FROM users ORDER BY id",
        )?;
        let rows = stmt.query_map([], user_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: Some(row.get(0)?),
        email: row.get(1)?,
        username: row.get(2)?,
        image: row.get(3)?,
        created_ts: row.get(4)?,
        modified_ts: row.get(5)?,
    })
}
