use axum::{
    Json,
    extract::{Path, State},
};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use teamtask_db::models::{Category, Permission};
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, team::TeamId},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1, message = "Category name must not be empty"))]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: String,
    pub team_id: String,
    pub name: String,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    TeamId(team_id): TeamId,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    state.teams.require_member(team_id, auth.user_id).await?;

    let categories = state.categories.find_by_team(team_id).await?;
    Ok(Json(categories.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    TeamId(team_id): TeamId,
    Json(body): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    body.validate()?;

    state
        .teams
        .require_permission(team_id, auth.user_id, Permission::ChangeSettings)
        .await?;

    let category = state.categories.create(team_id, body.name).await?;
    Ok(Json(to_response(category)))
}

pub async fn rename(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, category_id)): Path<(String, String)>,
    TeamId(team_id): TeamId,
    Json(body): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    body.validate()?;

    state
        .teams
        .require_permission(team_id, auth.user_id, Permission::ChangeSettings)
        .await?;

    let category_id = ObjectId::parse_str(&category_id)
        .map_err(|_| ApiError::BadRequest("Invalid category_id".to_string()))?;

    let category = state
        .categories
        .rename(team_id, category_id, body.name)
        .await?;
    Ok(Json(to_response(category)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, category_id)): Path<(String, String)>,
    TeamId(team_id): TeamId,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .teams
        .require_permission(team_id, auth.user_id, Permission::ChangeSettings)
        .await?;

    let category_id = ObjectId::parse_str(&category_id)
        .map_err(|_| ApiError::BadRequest("Invalid category_id".to_string()))?;

    state.categories.delete(team_id, category_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

fn to_response(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id.unwrap().to_hex(),
        team_id: category.team_id.to_hex(),
        name: category.name,
    }
}
