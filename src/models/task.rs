use serde::{Deserialize, Serialize};

use super::normalize_label;

/// Task workflow status
///
/// Declaration order is the workflow order used when sorting by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "In Review")]
    InReview,
    Completed,
    Blocked,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::InReview,
        TaskStatus::Completed,
        TaskStatus::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::InReview => "In Review",
            TaskStatus::Completed => "Completed",
            TaskStatus::Blocked => "Blocked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let wanted = normalize_label(s);
        // "todo" is what people type
        if wanted == "todo" {
            return Some(TaskStatus::ToDo);
        }
        Self::ALL.into_iter().find(|status| normalize_label(status.as_str()) == wanted)
    }

    pub fn rank(&self) -> i64 {
        *self as i64 + 1
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::ToDo
    }
}

/// Task priority, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
        TaskPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
            TaskPriority::Urgent => "Urgent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let wanted = normalize_label(s);
        Self::ALL.into_iter().find(|p| normalize_label(p.as_str()) == wanted)
    }

    pub fn rank(&self) -> i64 {
        *self as i64 + 1
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<i64>,
    pub project_id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assigned_to: Option<String>,
    pub due_ts: Option<i64>,
    pub tags: Vec<String>,
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl Task {
    /// Create a new task in the given project
    pub fn new(project_id: i64, title: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: None,
            project_id,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            assigned_to: None,
            due_ts: None,
            tags: Vec::new(),
            created_ts: now,
            modified_ts: now,
        }
    }

    /// Due date has passed and the task is not finished
    pub fn is_overdue(&self, now_ts: i64) -> bool {
        self.status != TaskStatus::Completed && self.due_ts.is_some_and(|due| due < now_ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_conversion() {
        assert_eq!(TaskStatus::ToDo.as_str(), "To Do");
        assert_eq!(TaskStatus::from_str("To Do"), Some(TaskStatus::ToDo));
        assert_eq!(TaskStatus::from_str("todo"), Some(TaskStatus::ToDo));
        assert_eq!(TaskStatus::from_str("in-review"), Some(TaskStatus::InReview));
        assert_eq!(TaskStatus::from_str("blocked"), Some(TaskStatus::Blocked));
        assert_eq!(TaskStatus::from_str("done"), None);
    }

    #[test]
    fn test_task_status_workflow_order() {
        assert!(TaskStatus::ToDo.rank() < TaskStatus::InProgress.rank());
        assert!(TaskStatus::InReview.rank() < TaskStatus::Completed.rank());
        assert!(TaskStatus::Completed.rank() < TaskStatus::Blocked.rank());
    }

    #[test]
    fn test_task_priority_conversion() {
        assert_eq!(TaskPriority::from_str("urgent"), Some(TaskPriority::Urgent));
        assert_eq!(TaskPriority::from_str("Critical"), None);
    }

    #[test]
    fn test_task_is_overdue() {
        let now = chrono::Utc::now().timestamp();
        let mut task = Task::new(1, "Ship it");
        assert!(!task.is_overdue(now));

        task.due_ts = Some(now - 3600);
        assert!(task.is_overdue(now));

        task.status = TaskStatus::Completed;
        assert!(!task.is_overdue(now));
    }
}
