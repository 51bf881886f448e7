//! Effective-rights resolution for team roles.
//!
//! Roles form a small directed graph: each named role carries a map of
//! direct grants and a list of parent role names. The effective rights of
//! a role are the depth-first merge of its parents (in list order, later
//! parents overwriting earlier ones) overlaid with the role's own grants,
//! which always win. Missing roles and inheritance cycles degrade to empty
//! rights instead of erroring, so a misconfigured role table fails closed.

use std::collections::{HashMap, HashSet};

use bson::oid::ObjectId;
use teamtask_db::models::{Permission, RoleDefinition, Team};
use teamtask_db::models::role::OWNER_ROLE;

/// Computes the flattened `{permission: granted}` map for `role_name`.
///
/// Deterministic and side-effect free for a fixed role table. A role name
/// absent from the table, or one revisited along the current inheritance
/// path, contributes nothing.
pub fn resolve_effective_rights(
    role_name: &str,
    roles: &HashMap<String, RoleDefinition>,
) -> HashMap<Permission, bool> {
    let mut path = HashSet::new();
    resolve(role_name, roles, &mut path)
}

fn resolve<'a>(
    role_name: &'a str,
    roles: &'a HashMap<String, RoleDefinition>,
    path: &mut HashSet<&'a str>,
) -> HashMap<Permission, bool> {
    let Some(role) = roles.get(role_name) else {
        return HashMap::new();
    };
    if !path.insert(role_name) {
        // Cycle guard: this role is already being resolved further up.
        return HashMap::new();
    }

    let mut effective = HashMap::new();
    for parent in &role.inherits {
        effective.extend(resolve(parent, roles, path));
    }
    // Own grants overlay last and win over anything inherited.
    effective.extend(role.rights.iter().map(|(p, granted)| (*p, *granted)));

    path.remove(role_name);
    effective
}

/// Answers "may `user_id` perform `permission` in `team`".
///
/// Non-members always get `false`. The `owner` role name short-circuits to
/// `true` before the role table is consulted: the team creator keeps
/// control even if the role table was edited into a broken state.
pub fn can_perform(team: &Team, user_id: ObjectId, permission: Permission) -> bool {
    let Some(member) = team.member(user_id) else {
        return false;
    };
    if member.role == OWNER_ROLE {
        return true;
    }
    resolve_effective_rights(&member.role, &team.settings.roles)
        .get(&permission)
        .copied()
        .unwrap_or(false)
}

/// The caller-facing rights map for one member, owner override included.
pub fn member_rights(team: &Team, user_id: ObjectId) -> HashMap<Permission, bool> {
    let Some(member) = team.member(user_id) else {
        return HashMap::new();
    };
    if member.role == OWNER_ROLE {
        return Permission::ALL.iter().map(|p| (*p, true)).collect();
    }
    resolve_effective_rights(&member.role, &team.settings.roles)
}
