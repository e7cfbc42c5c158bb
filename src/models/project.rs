use serde::{Deserialize, Serialize};

use super::normalize_label;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    Planning,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "On Hold")]
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Planning,
        ProjectStatus::InProgress,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
        ProjectStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "Planning",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::OnHold => "On Hold",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let wanted = normalize_label(s);
        Self::ALL.into_iter().find(|status| normalize_label(status.as_str()) == wanted)
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Planning
    }
}

/// Project priority, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProjectPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl ProjectPriority {
    pub const ALL: [ProjectPriority; 4] = [
        ProjectPriority::Low,
        ProjectPriority::Medium,
        ProjectPriority::High,
        ProjectPriority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectPriority::Low => "Low",
            ProjectPriority::Medium => "Medium",
            ProjectPriority::High => "High",
            ProjectPriority::Critical => "Critical",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let wanted = normalize_label(s);
        Self::ALL.into_iter().find(|p| normalize_label(p.as_str()) == wanted)
    }

    /// Numeric rank used for sorting (Low = 1 .. Critical = 4)
    pub fn rank(&self) -> i64 {
        *self as i64 + 1
    }

    pub fn is_high(&self) -> bool {
        matches!(self, ProjectPriority::High | ProjectPriority::Critical)
    }
}

impl Default for ProjectPriority {
    fn default() -> Self {
        ProjectPriority::Medium
    }
}

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: ProjectPriority,
    /// Percent complete, 0..=100
    pub completion: u8,
    pub tags: Vec<String>,
    pub start_ts: Option<i64>,
    pub target_end_ts: Option<i64>,
    pub actual_end_ts: Option<i64>,
    pub git_repo: Option<String>,
    pub domain: Option<String>,
    pub owner_id: Option<i64>,
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl Project {
    /// Create a new project with default status and priority
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: None,
            name: name.into(),
            description: String::new(),
            status: ProjectStatus::default(),
            priority: ProjectPriority::default(),
            completion: 0,
            tags: Vec::new(),
            start_ts: None,
            target_end_ts: None,
            actual_end_ts: None,
            git_repo: None,
            domain: None,
            owner_id: None,
            created_ts: now,
            modified_ts: now,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
