use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use teamtask_db::models::{Permission, RoleDefinition};
use teamtask_services::permissions::resolve_effective_rights;
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, team::TeamId},
    state::AppState,
    ws::dispatcher,
};

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertRoleRequest {
    #[validate(length(min = 1, message = "Label must not be empty"))]
    pub label: String,
    #[serde(default)]
    pub rights: HashMap<Permission, bool>,
    #[serde(default)]
    pub inherits: Vec<String>,
}

/// Lists the team's role table together with each role's resolved
/// effective rights, so clients need not reimplement inheritance.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    TeamId(team_id): TeamId,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let team = state.teams.require_member(team_id, auth.user_id).await?;

    let mut names: Vec<&String> = team.settings.roles.keys().collect();
    names.sort();

    let response: Vec<serde_json::Value> = names
        .into_iter()
        .map(|name| {
            let def = &team.settings.roles[name];
            let effective = resolve_effective_rights(name, &team.settings.roles);
            serde_json::json!({
                "name": name,
                "label": def.label,
                "rights": serde_json::to_value(&def.rights).unwrap_or_default(),
                "inherits": def.inherits,
                "effective_rights": serde_json::to_value(effective).unwrap_or_default(),
            })
        })
        .collect();

    Ok(Json(response))
}

pub async fn upsert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, name)): Path<(String, String)>,
    TeamId(team_id): TeamId,
    Json(body): Json<UpsertRoleRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    body.validate()?;

    state
        .teams
        .require_permission(team_id, auth.user_id, Permission::ManageRoles)
        .await?;

    let definition = RoleDefinition {
        label: body.label,
        rights: body.rights,
        inherits: body.inherits,
    };
    state.teams.upsert_role(team_id, &name, definition).await?;

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

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, name)): Path<(String, String)>,
    TeamId(team_id): TeamId,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .teams
        .require_permission(team_id, auth.user_id, Permission::ManageRoles)
        .await?;

    state.teams.delete_role(team_id, &name).await?;

    let team = state.teams.base.find_by_id(team_id).await?;
    dispatcher::notify_team(
        &state.ws_storage,
        &team,
        "team:updated",
        serde_json::json!({ "team_id": team_id.to_hex() }),
    )
    .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
