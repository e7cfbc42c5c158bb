use serde::{Deserialize, Serialize};

use super::Project;

/// The "current project" pointer. At most one is stored at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentSelection {
    pub name: String,
    pub project_id: String,
    pub created_ts: i64,
}

/// What the pointer resolves to once checked against the projects table
#[derive(Debug, Clone)]
pub enum Selection {
    /// Nothing has been selected
    None,
    /// The pointer names a project that no longer exists
    Stale(CurrentSelection),
    Active {
        current: CurrentSelection,
        project: Project,
    },
}

impl Selection {
    /// The active project, if any. Stale selections display as empty.
    pub fn project(&self) -> Option<&Project> {
        match self {
            Selection::Active { project, .. } => Some(project),
            _ => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Selection::Stale(_))
    }
}
