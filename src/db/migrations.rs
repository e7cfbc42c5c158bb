use rusqlite::{Connection, Result};
use std::collections::HashMap;

/// Current database schema version
const CURRENT_VERSION: u32 = 2;

/// Migration system for managing database schema versions
pub struct MigrationManager;

impl MigrationManager {
    /// Initialize the database with the current schema
    /// This creates the schema_version table and applies all migrations
    pub fn initialize(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version = Self::get_version(conn).unwrap_or(0);

        for version in (current_version + 1)..=CURRENT_VERSION {
            Self::apply_migration(conn, version)?;
        }

        Ok(())
    }

    /// Apply a specific migration by version number
    fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
        let migrations = get_migrations();
        if let Some(migration) = migrations.get(&version) {
            let tx = conn.unchecked_transaction()?;
            migration(&tx)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [version],
            )?;
            tx.commit()?;
            log::debug!("Applied schema migration v{}", version);
            Ok(())
        } else {
            Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
                Some(format!("No migration found for version {}", version)),
            ))
        }
    }

    /// Get the current schema version
    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

type Migration = fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>;

/// Get all migrations indexed by version
fn get_migrations() -> HashMap<u32, Migration> {
    let mut migrations: HashMap<u32, Migration> = HashMap::new();
    migrations.insert(1, migration_v1);
    migrations.insert(2, migration_v2);
    migrations
}

/// Migration v1: users, projects, tasks and their tags
fn migration_v1(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL,
            image TEXT NULL,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;

    tx.execute(
        "CREATE TABLE projects (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL,
            priority TEXT NOT NULL,
            completion INTEGER NOT NULL DEFAULT 0 CHECK(completion BETWEEN 0 AND 100),
            start_ts INTEGER NULL,
            target_end_ts INTEGER NULL,
            actual_end_ts INTEGER NULL,
            git_repo TEXT NULL,
            domain TEXT NULL,
            owner_id INTEGER NULL REFERENCES users(id),
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;
    // Note: status/priority hold display labels ('In Progress'); unknown labels are
    // skipped on read rather than failing the whole listing.
    tx.execute(
        "CREATE INDEX idx_projects_owner ON projects(owner_id)",
        [],
    )?;

    tx.execute(
        "CREATE TABLE project_tags (
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            ordinal INTEGER NOT NULL,
            tag TEXT NOT NULL,
            PRIMARY KEY(project_id, ordinal)
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_project_tags_tag ON project_tags(tag)",
        [],
    )?;

    tx.execute(
        "CREATE TABLE tasks (
            id INTEGER PRIMARY KEY,
            project_id INTEGER NOT NULL REFERENCES projects(id),
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL,
            priority TEXT NOT NULL,
            assigned_to TEXT NULL,
            due_ts INTEGER NULL,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_tasks_project_id ON tasks(project_id)",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_tasks_status ON tasks(status)",
        [],
    )?;

    tx.execute(
        "CREATE TABLE task_tags (
            task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            ordinal INTEGER NOT NULL,
            tag TEXT NOT NULL,
            PRIMARY KEY(task_id, ordinal)
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_task_tags_tag ON task_tags(tag)",
        [],
    )?;

    Ok(())
}

/// Migration v2: services and the current-project register
fn migration_v2(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE services (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            owner_id INTEGER NULL REFERENCES users(id),
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;
    // Note: name uniqueness per owner is checked in ServiceRepo; NULL owners
    // would slip past a UNIQUE(owner_id, name) constraint.
    tx.execute(
        "CREATE INDEX idx_services_owner_name ON services(owner_id, name)",
        [],
    )?;

    // Deliberately keyless: cardinality one is maintained by CurrentRepo::set,
    // and project_id is free text so a deleted project leaves a stale pointer.
    tx.execute(
        "CREATE TABLE current_project (
            name TEXT NOT NULL,
            project_id TEXT NOT NULL,
            created_ts INTEGER NOT NULL
        )",
        [],
    )?;

    Ok(())
}
