use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use teamtask_db::models::{Permission, Team, TaskStatus};
use teamtask_services::permissions::member_rights;
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, team::TeamId},
    state::AppState,
    ws::dispatcher,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, message = "Team name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JoinTeamRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub auto_notifications_enabled: Option<bool>,
    pub notification_template: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TeamSummaryResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub join_code: String,
    pub member_count: usize,
    pub my_role: String,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<TeamSummaryResponse>>, ApiError> {
    let teams = state.teams.find_user_teams(auth.user_id).await?;

    let response: Vec<TeamSummaryResponse> = teams
        .into_iter()
        .map(|t| to_summary(t, &auth))
        .collect();

    Ok(Json(response))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateTeamRequest>,
) -> Result<Json<TeamSummaryResponse>, ApiError> {
    body.validate()?;

    let team = state
        .teams
        .create(body.name, body.description, auth.user_id)
        .await?;

    Ok(Json(to_summary(team, &auth)))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    TeamId(team_id): TeamId,
) -> Result<Json<serde_json::Value>, ApiError> {
    let team = state.teams.require_member(team_id, auth.user_id).await?;
    Ok(Json(to_detail(&team)))
}

pub async fn join(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<JoinTeamRequest>,
) -> Result<Json<TeamSummaryResponse>, ApiError> {
    let team = state.teams.join_by_code(&body.code, auth.user_id).await?;

    dispatcher::notify_team(
        &state.ws_storage,
        &team,
        "team:updated",
        serde_json::json!({ "team_id": team.id.unwrap().to_hex() }),
    )
    .await;

    Ok(Json(to_summary(team, &auth)))
}

pub async fn leave(
    State(state): State<AppState>,
    auth: AuthUser,
    TeamId(team_id): TeamId,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Leaving is always self-serve; only membership itself is required.
    state.teams.require_member(team_id, auth.user_id).await?;
    state.teams.leave(team_id, auth.user_id).await?;

    Ok(Json(serde_json::json!({ "left": true })))
}

pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    TeamId(team_id): TeamId,
    Json(body): Json<UpdateSettingsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .teams
        .require_permission(team_id, auth.user_id, Permission::ChangeSettings)
        .await?;

    state
        .teams
        .update_settings(
            team_id,
            body.name,
            body.description,
            body.auto_notifications_enabled,
            body.notification_template,
        )
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

/// The caller's effective rights in this team, inheritance resolved.
pub async fn rights(
    State(state): State<AppState>,
    auth: AuthUser,
    TeamId(team_id): TeamId,
) -> Result<Json<serde_json::Value>, ApiError> {
    let team = state.teams.require_member(team_id, auth.user_id).await?;
    let rights = member_rights(&team, auth.user_id);

    Ok(Json(serde_json::to_value(rights).map_err(|e| {
        ApiError::Internal(e.to_string())
    })?))
}

/// Per-status task counts and per-member completion/points summary.
pub async fn report(
    State(state): State<AppState>,
    auth: AuthUser,
    TeamId(team_id): TeamId,
) -> Result<Json<serde_json::Value>, ApiError> {
    let team = state
        .teams
        .require_permission(team_id, auth.user_id, Permission::ViewReports)
        .await?;

    let tasks = state.tasks.find_by_team(team_id, None, None).await?;
    let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();

    let member_ids: Vec<bson::oid::ObjectId> =
        team.members.iter().map(|m| m.user_id).collect();
    let users = state.users.find_by_ids(&member_ids).await?;

    let members: Vec<serde_json::Value> = team
        .members
        .iter()
        .map(|m| {
            let user = users.iter().find(|u| u.id == Some(m.user_id));
            let completed = tasks
                .iter()
                .filter(|t| {
                    t.status == TaskStatus::Completed && t.assigned_to == Some(m.user_id)
                })
                .count();
            serde_json::json!({
                "user_id": m.user_id.to_hex(),
                "role": m.role,
                "full_name": user.map(|u| u.full_name.clone()),
                "points": user.map(|u| u.points),
                "level": user.map(|u| u.level.as_str()),
                "completed_tasks": completed,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "total": tasks.len(),
        "closed": count(TaskStatus::Closed),
        "open": count(TaskStatus::Open),
        "completed": count(TaskStatus::Completed),
        "members": members,
    })))
}

fn to_summary(team: Team, auth: &AuthUser) -> TeamSummaryResponse {
    let my_role = team
        .member(auth.user_id)
        .map(|m| m.role.clone())
        .unwrap_or_default();
    TeamSummaryResponse {
        id: team.id.unwrap().to_hex(),
        name: team.name,
        description: team.description,
        join_code: team.join_code,
        member_count: team.members.len(),
        my_role,
    }
}

fn to_detail(team: &Team) -> serde_json::Value {
    serde_json::json!({
        "id": team.id.unwrap().to_hex(),
        "name": team.name,
        "description": team.description,
        "join_code": team.join_code,
        "members": team.members.iter().map(|m| serde_json::json!({
            "user_id": m.user_id.to_hex(),
            "role": m.role,
        })).collect::<Vec<_>>(),
        "settings": {
            "roles": serde_json::to_value(&team.settings.roles).unwrap_or_default(),
            "auto_notifications_enabled": team.settings.auto_notifications_enabled,
            "notification_template": team.settings.notification_template,
        },
    })
}
