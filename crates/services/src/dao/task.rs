use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;
use teamtask_db::models::{NotificationRule, Task, TaskStatus};
use tracing::warn;

use super::base::{BaseDao, DaoError, DaoResult};
use super::user::UserDao;
use crate::gamification::points_for;
use crate::lifecycle::{is_valid_transition, unmet_dependencies};

/// Client-supplied task fields. Status is deliberately absent: tasks are
/// born `closed` no matter what the client sends.
#[derive(Debug, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub category_id: Option<ObjectId>,
    pub assigned_to: Option<ObjectId>,
    pub due_date: Option<DateTime>,
    pub priority: bool,
    pub dependencies: Vec<ObjectId>,
    pub notification: NotificationRule,
}

/// Field updates for an existing task. `None` leaves a field untouched.
#[derive(Debug, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Option<ObjectId>>,
    pub assigned_to: Option<Option<ObjectId>>,
    pub due_date: Option<Option<DateTime>>,
    pub priority: Option<bool>,
    pub dependencies: Option<Vec<ObjectId>>,
    pub notification: Option<NotificationRule>,
}

pub struct TaskDao {
    pub base: BaseDao<Task>,
    users: UserDao,
}

impl TaskDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Task::COLLECTION),
            users: UserDao::new(db),
        }
    }

    pub async fn create(
        &self,
        team_id: ObjectId,
        created_by: ObjectId,
        draft: TaskDraft,
    ) -> DaoResult<Task> {
        if draft.title.trim().is_empty() {
            return Err(DaoError::Validation("Title must not be empty".to_string()));
        }

        let now = DateTime::now();
        let task = Task {
            id: None,
            team_id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            category_id: draft.category_id,
            assigned_to: draft.assigned_to,
            due_date: draft.due_date,
            priority: draft.priority,
            status: TaskStatus::Closed,
            dependencies: draft.dependencies,
            notification: draft.notification,
            created_by,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&task).await?;
        self.base.find_by_id(id).await
    }

    pub async fn update(
        &self,
        team_id: ObjectId,
        task_id: ObjectId,
        patch: TaskPatch,
    ) -> DaoResult<Task> {
        let mut update = bson::Document::new();
        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(DaoError::Validation("Title must not be empty".to_string()));
            }
            update.insert("title", title.trim());
        }
        if let Some(description) = patch.description {
            update.insert("description", description);
        }
        if let Some(category_id) = patch.category_id {
            update.insert("category_id", category_id);
        }
        if let Some(assigned_to) = patch.assigned_to {
            update.insert("assigned_to", assigned_to);
        }
        if let Some(due_date) = patch.due_date {
            update.insert("due_date", due_date);
        }
        if let Some(priority) = patch.priority {
            update.insert("priority", priority);
        }
        if let Some(dependencies) = patch.dependencies {
            if dependencies.contains(&task_id) {
                return Err(DaoError::Validation(
                    "A task cannot depend on itself".to_string(),
                ));
            }
            update.insert("dependencies", dependencies);
        }
        if let Some(notification) = patch.notification {
            update.insert("notification", bson::to_bson(&notification)?);
        }

        if !update.is_empty() {
            let changed = self
                .base
                .update_one(
                    doc! { "_id": task_id, "team_id": team_id },
                    doc! { "$set": update },
                )
                .await?;
            if !changed {
                return Err(DaoError::NotFound);
            }
        }

        self.base.find_by_id_in_team(team_id, task_id).await
    }

    pub async fn find_by_team(
        &self,
        team_id: ObjectId,
        status: Option<TaskStatus>,
        assigned_to: Option<ObjectId>,
    ) -> DaoResult<Vec<Task>> {
        let mut filter = doc! { "team_id": team_id };
        if let Some(status) = status {
            filter.insert("status", status.as_str());
        }
        if let Some(user_id) = assigned_to {
            filter.insert("assigned_to", user_id);
        }

        self.base
            .find_many(filter, Some(doc! { "created_at": -1 }))
            .await
    }

    /// Moves a task along one edge of the state machine.
    ///
    /// Finishing is gated on every dependency being `completed`; an id
    /// that resolves to no task (deleted dependency) blocks the gate.
    /// The status write compares against the status that was read, so a
    /// concurrent or duplicate attempt matches nothing and awards nothing.
    pub async fn transition(
        &self,
        team_id: ObjectId,
        task_id: ObjectId,
        to: TaskStatus,
        actor_id: ObjectId,
    ) -> DaoResult<Task> {
        let task = self.base.find_by_id_in_team(team_id, task_id).await?;
        let from = task.status;

        if !is_valid_transition(from, to) {
            return Err(DaoError::Validation(format!(
                "A {} task cannot be moved to {}",
                from.as_str(),
                to.as_str()
            )));
        }

        if to == TaskStatus::Completed && !task.dependencies.is_empty() {
            let loaded = self
                .base
                .find_many(
                    doc! {
                        "_id": { "$in": task.dependencies.clone() },
                        "team_id": team_id,
                    },
                    None,
                )
                .await?;
            let unmet = unmet_dependencies(&task.dependencies, &loaded);
            if !unmet.is_empty() {
                return Err(DaoError::Validation(format!(
                    "{} dependencies are not completed yet",
                    unmet.len()
                )));
            }
        }

        let updated = self
            .base
            .find_one_and_update(
                doc! {
                    "_id": task_id,
                    "team_id": team_id,
                    "status": from.as_str(),
                },
                doc! { "$set": { "status": to.as_str() } },
            )
            .await?
            .ok_or_else(|| {
                DaoError::Conflict("Task status changed concurrently".to_string())
            })?;

        // Award strictly on the edge into completed. The compare-and-set
        // above guarantees this runs at most once per genuine transition.
        if to == TaskStatus::Completed {
            let beneficiary = updated.assigned_to.unwrap_or(actor_id);
            let amount = points_for(updated.priority);
            if let Err(e) = self.users.award_points(beneficiary, amount).await {
                warn!(%task_id, %beneficiary, error = %e, "Task completed but point award failed");
                return Err(e);
            }
        }

        Ok(updated)
    }

    /// Deletes the task. Ids referencing it from other tasks'
    /// `dependencies` are left dangling; readers treat them as unmet.
    pub async fn delete(&self, team_id: ObjectId, task_id: ObjectId) -> DaoResult<()> {
        let deleted = self
            .base
            .hard_delete(doc! { "_id": task_id, "team_id": team_id })
            .await?;
        if deleted == 0 {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }
}
