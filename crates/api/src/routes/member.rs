use axum::{
    Json,
    extract::{Path, State},
};
use bson::oid::ObjectId;
use serde::Deserialize;
use teamtask_db::models::Permission;
use teamtask_db::models::role::DEFAULT_ROLE;

use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, team::TeamId},
    state::AppState,
    ws::dispatcher,
};

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    TeamId(team_id): TeamId,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let team = state.teams.require_member(team_id, auth.user_id).await?;

    let member_ids: Vec<ObjectId> = team.members.iter().map(|m| m.user_id).collect();
    let users = state.users.find_by_ids(&member_ids).await?;

    let response: Vec<serde_json::Value> = team
        .members
        .iter()
        .map(|m| {
            let user = users.iter().find(|u| u.id == Some(m.user_id));
            serde_json::json!({
                "user_id": m.user_id.to_hex(),
                "role": m.role,
                "full_name": user.map(|u| u.full_name.clone()),
                "email": user.map(|u| u.email.clone()),
                "points": user.map(|u| u.points),
                "level": user.map(|u| u.level.as_str()),
            })
        })
        .collect();

    Ok(Json(response))
}

pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    TeamId(team_id): TeamId,
    Json(body): Json<AddMemberRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .teams
        .require_permission(team_id, auth.user_id, Permission::Invite)
        .await?;

    let user_id = ObjectId::parse_str(&body.user_id)
        .map_err(|_| ApiError::BadRequest("Invalid user_id".to_string()))?;
    let role = body.role.as_deref().unwrap_or(DEFAULT_ROLE);

    let team = state.teams.add_member(team_id, user_id, role).await?;

    dispatcher::notify_team(
        &state.ws_storage,
        &team,
        "team:updated",
        serde_json::json!({ "team_id": team_id.to_hex() }),
    )
    .await;

    Ok(Json(serde_json::json!({ "added": true })))
}

pub async fn change_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, user_id)): Path<(String, String)>,
    TeamId(team_id): TeamId,
    Json(body): Json<ChangeRoleRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .teams
        .require_permission(team_id, auth.user_id, Permission::ManageRoles)
        .await?;

    let target_id = ObjectId::parse_str(&user_id)
        .map_err(|_| ApiError::BadRequest("Invalid user_id".to_string()))?;

    state
        .teams
        .change_member_role(team_id, auth.user_id, target_id, &body.role)
        .await?;

    let team = state.teams.base.find_by_id(team_id).await?;
    dispatcher::notify_team(
        &state.ws_storage,
        &team,
        "team:updated",
        serde_json::json!({ "team_id": team_id.to_hex() }),
    )
    .await;

    Ok(Json(serde_json::json!({ "updated": true })))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, user_id)): Path<(String, String)>,
    TeamId(team_id): TeamId,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .teams
        .require_permission(team_id, auth.user_id, Permission::ManageRoles)
        .await?;

    let target_id = ObjectId::parse_str(&user_id)
        .map_err(|_| ApiError::BadRequest("Invalid user_id".to_string()))?;

    state
        .teams
        .remove_member(team_id, auth.user_id, target_id)
        .await?;

    let team = state.teams.base.find_by_id(team_id).await?;
    dispatcher::notify_team(
        &state.ws_storage,
        &team,
        "team:updated",
        serde_json::json!({ "team_id": team_id.to_hex() }),
    )
    .await;

    Ok(Json(serde_json::json!({ "removed": true })))
}
