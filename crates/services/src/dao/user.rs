use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;
use teamtask_db::models::{GlobalRole, Level, User};

use super::base::{BaseDao, DaoError, DaoResult};
use crate::gamification::level_for_points;

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        email: String,
        full_name: String,
        password_hash: String,
    ) -> DaoResult<User> {
        let now = DateTime::now();
        let user = User {
            id: None,
            email,
            full_name,
            password_hash: Some(password_hash),
            global_role: GlobalRole::User,
            team_ids: Vec::new(),
            points: 0,
            level: Level::Novice,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&user).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! { "email": email })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn update_profile(
        &self,
        user_id: ObjectId,
        full_name: Option<String>,
    ) -> DaoResult<bool> {
        let mut update = bson::Document::new();
        if let Some(name) = full_name {
            update.insert("full_name", name);
        }

        if update.is_empty() {
            return Ok(false);
        }

        self.base
            .update_by_id(user_id, doc! { "$set": update })
            .await
    }

    /// Adds `amount` to the user's point total atomically and recomputes
    /// the stored level from the post-increment total. Concurrent awards
    /// both land; the level is monotone in points, so whichever recompute
    /// writes last is consistent with some observed total.
    pub async fn award_points(&self, user_id: ObjectId, amount: i64) -> DaoResult<User> {
        let mut user = self
            .base
            .find_one_and_update(doc! { "_id": user_id }, doc! { "$inc": { "points": amount } })
            .await?
            .ok_or(DaoError::NotFound)?;

        let level = level_for_points(user.points);
        if level != user.level {
            self.base
                .update_by_id(
                    user_id,
                    doc! { "$set": { "level": level.as_str() } },
                )
                .await?;
            user.level = level;
        }
        Ok(user)
    }

    pub async fn find_by_ids(&self, ids: &[ObjectId]) -> DaoResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base
            .find_many(
                doc! { "_id": { "$in": ids.to_vec() } },
                Some(doc! { "full_name": 1 }),
            )
            .await
    }
}
