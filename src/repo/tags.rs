// Ordered tag lists stored in project_tags / task_tags

use rusqlite::Connection;
use std::collections::HashMap;
use anyhow::Result;

/// Which tag table to use
#[derive(Debug, Clone, Copy)]
pub(crate) enum TagTable {
    Project,
    Task,
}

impl TagTable {
    fn table(self) -> &'static str {
        match self {
            TagTable::Project => "project_tags",
            TagTable::Task => "task_tags",
        }
    }

    fn owner_column(self) -> &'static str {
        match self {
            TagTable::Project => "project_id",
            TagTable::Task => "task_id",
        }
    }
}

/// Replace the tag list of one row, preserving order
pub(crate) fn replace_tags(conn: &Connection, table: TagTable, owner_id: i64, tags: &[String]) -> Result<()> {
    conn.execute(
        &format!("DELETE FROM {} WHERE {} = ?1", table.table(), table.owner_column()),
        [owner_id],
    )?;
    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {} ({}, ordinal, tag) VALUES (?1, ?2, ?3)",
        table.table(),
        table.owner_column()
    ))?;
    for (ordinal, tag) in tags.iter().enumerate() {
        stmt.execute(rusqlite::params![owner_id, ordinal as i64, tag])?;
    }
    Ok(())
}

/// Tags for one row in insertion order
pub(crate) fn get_tags(conn: &Connection, table: TagTable, owner_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT tag FROM {} WHERE {} = ?1 ORDER BY ordinal",
        table.table(),
        table.owner_column()
    ))?;
    let rows = stmt.query_map([owner_id], |row| row.get::<_, String>(0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Tags for every row of a table, keyed by owner id
pub(crate) fn all_tags(conn: &Connection, table: TagTable) -> Result<HashMap<i64, Vec<String>>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}, tag FROM {} ORDER BY {}, ordinal",
        table.owner_column(),
        table.table(),
        table.owner_column()
    ))?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;

    let mut tags: HashMap<i64, Vec<String>> = HashMap::new();
    for row in rows {
        let (owner_id, tag) = row?;
        tags.entry(owner_id).or_default().push(tag);
    }
    Ok(tags)
}
