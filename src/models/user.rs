use serde::{Deserialize, Serialize};

/// User model. Identity is established elsewhere; this is only the owner record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub email: String,
    pub username: String,
    pub image: Option<String>,
    pub created_ts: i64,
    pub modified_ts: i64,
}
