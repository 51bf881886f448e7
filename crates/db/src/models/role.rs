use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Role name reserved for the team creator. Always resolves to full rights,
/// even when the role table no longer contains an entry for it.
pub const OWNER_ROLE: &str = "owner";

/// Role name assigned to users joining via a join code, and the fallback
/// referenced by members whose role key was never customized.
pub const DEFAULT_ROLE: &str = "member";

/// One grantable capability inside a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    CreateTask,
    EditTask,
    CompleteTask,
    DeleteTask,
    ManageRoles,
    ChangeSettings,
    Invite,
    ViewReports,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::CreateTask,
        Permission::EditTask,
        Permission::CompleteTask,
        Permission::DeleteTask,
        Permission::ManageRoles,
        Permission::ChangeSettings,
        Permission::Invite,
        Permission::ViewReports,
    ];
}

/// A named bundle of direct permission grants plus the role names it
/// inherits from. Inheritance is a data relationship resolved at query
/// time, not a type relationship: teams edit these at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub label: String,
    #[serde(default)]
    pub rights: HashMap<Permission, bool>,
    #[serde(default)]
    pub inherits: Vec<String>,
}

impl RoleDefinition {
    pub fn new(label: &str, rights: &[(Permission, bool)], inherits: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            rights: rights.iter().copied().collect(),
            inherits: inherits.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Seed templates copied into every new team's role table. Once copied
/// they are ordinary role definitions the team may edit or delete.
pub fn role_templates() -> HashMap<String, RoleDefinition> {
    let mut roles = HashMap::new();
    roles.insert(
        OWNER_ROLE.to_string(),
        RoleDefinition::new(
            "Owner",
            &Permission::ALL.map(|p| (p, true)),
            &[],
        ),
    );
    roles.insert(
        DEFAULT_ROLE.to_string(),
        RoleDefinition::new(
            "Member",
            &[
                (Permission::CreateTask, true),
                (Permission::EditTask, true),
                (Permission::CompleteTask, true),
            ],
            &[],
        ),
    );
    roles.insert(
        "manager".to_string(),
        RoleDefinition::new(
            "Manager",
            &[
                (Permission::Invite, true),
                (Permission::ManageRoles, true),
                (Permission::ChangeSettings, true),
                (Permission::DeleteTask, false),
            ],
            &[DEFAULT_ROLE],
        ),
    );
    roles.insert(
        "observer".to_string(),
        RoleDefinition::new("Observer", &[], &[]),
    );
    roles.insert(
        "analyst".to_string(),
        RoleDefinition::new("Analyst", &[(Permission::ViewReports, true)], &[]),
    );
    roles
}
