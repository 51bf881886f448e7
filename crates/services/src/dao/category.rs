use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;
use teamtask_db::models::Category;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct CategoryDao {
    pub base: BaseDao<Category>,
}

impl CategoryDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Category::COLLECTION),
        }
    }

    pub async fn create(&self, team_id: ObjectId, name: String) -> DaoResult<Category> {
        if name.trim().is_empty() {
            return Err(DaoError::Validation(
                "Category name must not be empty".to_string(),
            ));
        }

        let now = DateTime::now();
        let category = Category {
            id: None,
            team_id,
            name: name.trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&category).await?;
        self.base.find_by_id(id).await
    }

    pub async fn rename(
        &self,
        team_id: ObjectId,
        category_id: ObjectId,
        name: String,
    ) -> DaoResult<Category> {
        if name.trim().is_empty() {
            return Err(DaoError::Validation(
                "Category name must not be empty".to_string(),
            ));
        }

        let changed = self
            .base
            .update_one(
                doc! { "_id": category_id, "team_id": team_id },
                doc! { "$set": { "name": name.trim() } },
            )
            .await?;
        if !changed {
            return Err(DaoError::NotFound);
        }

        self.base.find_by_id_in_team(team_id, category_id).await
    }

    pub async fn find_by_team(&self, team_id: ObjectId) -> DaoResult<Vec<Category>> {
        self.base
            .find_many(doc! { "team_id": team_id }, Some(doc! { "name": 1 }))
            .await
    }

    pub async fn delete(&self, team_id: ObjectId, category_id: ObjectId) -> DaoResult<()> {
        let deleted = self
            .base
            .hard_delete(doc! { "_id": category_id, "team_id": team_id })
            .await?;
        if deleted == 0 {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }
}
