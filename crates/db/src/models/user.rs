use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    /// Flat legacy role, read once at session start and carried in the JWT
    /// claims. Plays no part in per-team authorization.
    #[serde(default)]
    pub global_role: GlobalRole,
    /// Back-references to teams this user belongs to. The embedded member
    /// array on the team document is the authoritative record.
    #[serde(default)]
    pub team_ids: Vec<ObjectId>,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub level: Level,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum GlobalRole {
    Admin,
    #[default]
    User,
}

/// Discrete progression label derived from accumulated points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum Level {
    #[default]
    Novice,
    Intermediate,
    Expert,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Novice => "Novice",
            Level::Intermediate => "Intermediate",
            Level::Expert => "Expert",
        }
    }
}

impl User {
    pub const COLLECTION: &'static str = "users";
}
