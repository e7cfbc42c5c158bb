// Core data models for Taskdeck
// These structs represent the domain entities

pub mod project;
pub mod task;
pub mod service;
pub mod user;
pub mod current;

pub use project::*;
pub use task::*;
pub use service::*;
pub use user::*;
pub use current::*;

/// Normalize an enum label for lookup: "in-progress", "IN_PROGRESS" and
/// "In Progress" all become "in progress"
pub(crate) fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c.to_ascii_lowercase() })
        .collect()
}
