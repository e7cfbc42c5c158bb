use serde::{Deserialize, Serialize};

/// Colour used when a service is created without one
pub const DEFAULT_SERVICE_COLOR: &str = "#3B82F6";

/// Service model: a named, coloured tag definition owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Option<i64>,
    pub name: String,
    pub color: String,
    pub owner_id: Option<i64>,
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: None,
            name: name.into(),
            color: DEFAULT_SERVICE_COLOR.to_string(),
            owner_id: None,
            created_ts: now,
            modified_ts: now,
        }
    }
}

/// Check a `#RGB` or `#RRGGBB` colour string
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
