use std::collections::HashMap;

use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::role::{RoleDefinition, role_templates};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: Option<String>,
    /// Short code handed out for self-service joining.
    pub join_code: String,
    #[serde(default)]
    pub members: Vec<TeamMember>,
    #[serde(default)]
    pub settings: TeamSettings,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: ObjectId,
    /// Key into `settings.roles`. A key without a matching role definition
    /// resolves to empty rights rather than an error.
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSettings {
    #[serde(default)]
    pub roles: HashMap<String, RoleDefinition>,
    #[serde(default)]
    pub auto_notifications_enabled: bool,
    pub notification_template: Option<String>,
}

impl Default for TeamSettings {
    fn default() -> Self {
        Self {
            roles: role_templates(),
            auto_notifications_enabled: false,
            notification_template: None,
        }
    }
}

impl Team {
    pub const COLLECTION: &'static str = "teams";

    pub fn member(&self, user_id: ObjectId) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    pub fn is_member(&self, user_id: ObjectId) -> bool {
        self.member(user_id).is_some()
    }
}
