use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;
use nanoid::nanoid;
use teamtask_db::models::{Permission, RoleDefinition, Team, TeamMember, TeamSettings, User};
use teamtask_db::models::role::{DEFAULT_ROLE, OWNER_ROLE};
use tracing::warn;

use super::base::{BaseDao, DaoError, DaoResult};
use crate::permissions::can_perform;

const JOIN_CODE_LEN: usize = 6;
const JOIN_CODE_ALPHABET: [char; 36] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

pub struct TeamDao {
    pub base: BaseDao<Team>,
    users: BaseDao<User>,
}

impl TeamDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Team::COLLECTION),
            users: BaseDao::new(db, User::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        name: String,
        description: Option<String>,
        owner_id: ObjectId,
    ) -> DaoResult<Team> {
        if name.trim().is_empty() {
            return Err(DaoError::Validation("Team name must not be empty".to_string()));
        }

        let now = DateTime::now();
        let team = Team {
            id: None,
            name: name.trim().to_string(),
            description,
            join_code: nanoid!(JOIN_CODE_LEN, &JOIN_CODE_ALPHABET),
            members: vec![TeamMember {
                user_id: owner_id,
                role: OWNER_ROLE.to_string(),
            }],
            settings: TeamSettings::default(),
            created_at: now,
            updated_at: now,
        };

        let team_id = self.base.insert_one(&team).await?;
        self.link_user(team_id, owner_id).await?;

        self.base.find_by_id(team_id).await
    }

    pub async fn find_by_join_code(&self, code: &str) -> DaoResult<Team> {
        self.base
            .find_one(doc! { "join_code": code })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_user_teams(&self, user_id: ObjectId) -> DaoResult<Vec<Team>> {
        self.base
            .find_many(
                doc! { "members.user_id": user_id },
                Some(doc! { "name": 1 }),
            )
            .await
    }

    /// Self-service join via the team's code. Member append and the user
    /// back-reference are two separate writes with no transaction around
    /// them; a failure in between is logged before propagating.
    pub async fn join_by_code(&self, code: &str, user_id: ObjectId) -> DaoResult<Team> {
        let team = self.find_by_join_code(code.trim()).await?;
        let team_id = team.id.unwrap();

        if team.is_member(user_id) {
            return Err(DaoError::Validation(
                "You are already a member of this team".to_string(),
            ));
        }

        self.push_member(team_id, user_id, DEFAULT_ROLE).await?;
        self.link_user(team_id, user_id).await?;

        self.base.find_by_id(team_id).await
    }

    /// Admin-path member addition (`invite` permission, checked by the caller).
    pub async fn add_member(
        &self,
        team_id: ObjectId,
        user_id: ObjectId,
        role: &str,
    ) -> DaoResult<Team> {
        valid_role_name(role)?;
        // The target user must exist before wiring up a membership.
        self.users.find_by_id(user_id).await?;

        self.push_member(team_id, user_id, role).await?;
        self.link_user(team_id, user_id).await?;

        self.base.find_by_id(team_id).await
    }

    /// Changes a member's role key. Members can never change their own.
    pub async fn change_member_role(
        &self,
        team_id: ObjectId,
        actor_id: ObjectId,
        target_id: ObjectId,
        role: &str,
    ) -> DaoResult<()> {
        if actor_id == target_id {
            return Err(DaoError::Forbidden(
                "You cannot change your own role".to_string(),
            ));
        }
        valid_role_name(role)?;

        let changed = self
            .base
            .update_one(
                doc! { "_id": team_id, "members.user_id": target_id },
                doc! { "$set": { "members.$.role": role } },
            )
            .await?;
        if !changed {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }

    /// Admin-path removal. Members can never remove themselves here;
    /// leaving is a separate self-serve operation.
    pub async fn remove_member(
        &self,
        team_id: ObjectId,
        actor_id: ObjectId,
        target_id: ObjectId,
    ) -> DaoResult<()> {
        if actor_id == target_id {
            return Err(DaoError::Forbidden(
                "You cannot remove yourself; leave the team instead".to_string(),
            ));
        }
        self.pull_member(team_id, target_id).await
    }

    /// Always-self-serve exit, independent of any permission.
    pub async fn leave(&self, team_id: ObjectId, user_id: ObjectId) -> DaoResult<()> {
        self.pull_member(team_id, user_id).await
    }

    pub async fn update_settings(
        &self,
        team_id: ObjectId,
        name: Option<String>,
        description: Option<String>,
        auto_notifications_enabled: Option<bool>,
        notification_template: Option<String>,
    ) -> DaoResult<bool> {
        let mut update = bson::Document::new();
        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(DaoError::Validation("Team name must not be empty".to_string()));
            }
            update.insert("name", name.trim());
        }
        if let Some(description) = description {
            update.insert("description", description);
        }
        if let Some(enabled) = auto_notifications_enabled {
            update.insert("settings.auto_notifications_enabled", enabled);
        }
        if let Some(template) = notification_template {
            update.insert("settings.notification_template", template);
        }

        if update.is_empty() {
            return Ok(false);
        }

        self.base
            .update_by_id(team_id, doc! { "$set": update })
            .await
    }

    /// Creates or replaces one role definition in the team's role table.
    pub async fn upsert_role(
        &self,
        team_id: ObjectId,
        name: &str,
        definition: RoleDefinition,
    ) -> DaoResult<()> {
        valid_role_name(name)?;
        if definition.inherits.iter().any(|parent| parent == name) {
            return Err(DaoError::Validation(
                "A role cannot inherit from itself".to_string(),
            ));
        }

        let field = format!("settings.roles.{name}");
        let changed = self
            .base
            .update_by_id(team_id, doc! { "$set": { (field): bson::to_bson(&definition)? } })
            .await?;
        if !changed {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }

    /// Removes a role definition. Members still referencing the key are
    /// left in place and resolve to empty rights from then on.
    pub async fn delete_role(&self, team_id: ObjectId, name: &str) -> DaoResult<()> {
        valid_role_name(name)?;

        let field = format!("settings.roles.{name}");
        let changed = self
            .base
            .update_one(
                doc! { "_id": team_id, (field.clone()): { "$exists": true } },
                doc! { "$unset": { (field): "" } },
            )
            .await?;
        if !changed {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }

    /// Loads the team and requires plain membership.
    pub async fn require_member(&self, team_id: ObjectId, user_id: ObjectId) -> DaoResult<Team> {
        let team = self.base.find_by_id(team_id).await?;
        if !team.is_member(user_id) {
            return Err(DaoError::Forbidden("Not a member of this team".to_string()));
        }
        Ok(team)
    }

    /// Loads the team and requires `permission` for `user_id`. All task,
    /// role and settings mutations go through here before touching state.
    pub async fn require_permission(
        &self,
        team_id: ObjectId,
        user_id: ObjectId,
        permission: Permission,
    ) -> DaoResult<Team> {
        let team = self.base.find_by_id(team_id).await?;
        if !can_perform(&team, user_id, permission) {
            return Err(DaoError::Forbidden(format!(
                "Missing the {permission:?} right in this team"
            )));
        }
        Ok(team)
    }

    async fn push_member(
        &self,
        team_id: ObjectId,
        user_id: ObjectId,
        role: &str,
    ) -> DaoResult<()> {
        let member = TeamMember {
            user_id,
            role: role.to_string(),
        };
        // The membership filter makes concurrent double-joins a no-op.
        let added = self
            .base
            .update_one(
                doc! { "_id": team_id, "members.user_id": { "$ne": user_id } },
                doc! { "$push": { "members": bson::to_bson(&member)? } },
            )
            .await?;
        if !added {
            return Err(DaoError::Validation(
                "User is already a member of this team".to_string(),
            ));
        }
        Ok(())
    }

    async fn pull_member(&self, team_id: ObjectId, user_id: ObjectId) -> DaoResult<()> {
        let removed = self
            .base
            .update_one(
                doc! { "_id": team_id, "members.user_id": user_id },
                doc! { "$pull": { "members": { "user_id": user_id } } },
            )
            .await?;
        if !removed {
            return Err(DaoError::NotFound);
        }

        if let Err(e) = self
            .users
            .update_one(
                doc! { "_id": user_id },
                doc! { "$pull": { "team_ids": team_id } },
            )
            .await
        {
            warn!(%team_id, %user_id, error = %e, "Membership removed but user back-reference not updated");
            return Err(e);
        }
        Ok(())
    }

    async fn link_user(&self, team_id: ObjectId, user_id: ObjectId) -> DaoResult<()> {
        if let Err(e) = self
            .users
            .update_one(
                doc! { "_id": user_id },
                doc! { "$addToSet": { "team_ids": team_id } },
            )
            .await
        {
            warn!(%team_id, %user_id, error = %e, "Member added but user back-reference not updated");
            return Err(e);
        }
        Ok(())
    }
}

/// Role names become field paths under `settings.roles`, so the character
/// set is restricted accordingly.
fn valid_role_name(name: &str) -> DaoResult<()> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(DaoError::Validation(
            "Role names may only contain letters, digits, '_' and '-'".to_string(),
        ))
    }
}
