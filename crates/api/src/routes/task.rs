use axum::{
    Json,
    extract::{Path, Query, State},
};
use bson::oid::ObjectId;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use teamtask_db::models::{
    NotificationInterval, NotificationRule, Permission, Task, TaskStatus,
};
use teamtask_services::dao::task::{TaskDraft, TaskPatch};
use teamtask_services::lifecycle::permission_for;
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, team::TeamId},
    state::AppState,
    ws::dispatcher,
};

#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Never,
    Once,
    Interval,
    Daily,
    Trigger,
}

/// Client-supplied `status` is deliberately not a field here: tasks are
/// born `closed`, whatever the request body claims.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<chrono::DateTime<Utc>>,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub notification_type: NotificationKind,
    pub notification_date: Option<chrono::DateTime<Utc>>,
    pub notification_interval: Option<NotificationInterval>,
    pub notification_daily_time: Option<String>,
    pub notification_trigger: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    /// Empty string clears the field, mirroring the unassigned form value.
    pub category_id: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<chrono::DateTime<Utc>>,
    pub priority: Option<bool>,
    pub dependencies: Option<Vec<String>>,
    pub notification_type: Option<NotificationKind>,
    pub notification_date: Option<chrono::DateTime<Utc>>,
    pub notification_interval: Option<NotificationInterval>,
    pub notification_daily_time: Option<String>,
    pub notification_trigger: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub team_id: String,
    pub title: String,
    pub description: String,
    pub category_id: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<String>,
    pub priority: bool,
    pub status: String,
    pub dependencies: Vec<String>,
    pub notification: serde_json::Value,
    pub created_by: String,
    pub created_at: String,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    TeamId(team_id): TeamId,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    state.teams.require_member(team_id, auth.user_id).await?;

    let assigned_to = query
        .assigned_to
        .as_deref()
        .map(|s| parse_oid(s, "assigned_to"))
        .transpose()?;

    let tasks = state
        .tasks
        .find_by_team(team_id, query.status, assigned_to)
        .await?;

    Ok(Json(tasks.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    TeamId(team_id): TeamId,
    Json(body): Json<CreateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    body.validate()?;

    let team = state
        .teams
        .require_permission(team_id, auth.user_id, Permission::CreateTask)
        .await?;

    let notification = build_notification(
        body.notification_type,
        body.notification_date,
        body.notification_interval,
        body.notification_daily_time,
        body.notification_trigger,
    )?;

    let draft = TaskDraft {
        title: body.title,
        description: body.description,
        category_id: parse_optional_oid(body.category_id.as_deref(), "category_id")?,
        assigned_to: parse_optional_oid(body.assigned_to.as_deref(), "assigned_to")?,
        due_date: body.due_date.map(bson::DateTime::from_chrono),
        priority: body.priority,
        dependencies: parse_oids(&body.dependencies, "dependencies")?,
        notification,
    };

    let task = state.tasks.create(team_id, auth.user_id, draft).await?;

    dispatcher::notify_team(
        &state.ws_storage,
        &team,
        "task:created",
        serde_json::to_value(to_response(task.clone())).unwrap_or_default(),
    )
    .await;

    Ok(Json(to_response(task)))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, task_id)): Path<(String, String)>,
    TeamId(team_id): TeamId,
) -> Result<Json<TaskResponse>, ApiError> {
    state.teams.require_member(team_id, auth.user_id).await?;

    let task_id = parse_oid(&task_id, "task_id")?;
    let task = state.tasks.base.find_by_id_in_team(team_id, task_id).await?;

    Ok(Json(to_response(task)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, task_id)): Path<(String, String)>,
    TeamId(team_id): TeamId,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    body.validate()?;

    let team = state
        .teams
        .require_permission(team_id, auth.user_id, Permission::EditTask)
        .await?;

    let task_id = parse_oid(&task_id, "task_id")?;

    let notification = match body.notification_type {
        Some(kind) => Some(build_notification(
            kind,
            body.notification_date,
            body.notification_interval,
            body.notification_daily_time,
            body.notification_trigger,
        )?),
        None => None,
    };

    let patch = TaskPatch {
        title: body.title,
        description: body.description,
        category_id: body
            .category_id
            .as_deref()
            .map(|s| parse_clearable_oid(s, "category_id"))
            .transpose()?,
        assigned_to: body
            .assigned_to
            .as_deref()
            .map(|s| parse_clearable_oid(s, "assigned_to"))
            .transpose()?,
        due_date: body.due_date.map(|d| Some(bson::DateTime::from_chrono(d))),
        priority: body.priority,
        dependencies: body
            .dependencies
            .as_deref()
            .map(|d| parse_oids(d, "dependencies"))
            .transpose()?,
        notification,
    };

    let task = state.tasks.update(team_id, task_id, patch).await?;

    dispatcher::notify_team(
        &state.ws_storage,
        &team,
        "task:updated",
        serde_json::to_value(to_response(task.clone())).unwrap_or_default(),
    )
    .await;

    Ok(Json(to_response(task)))
}

/// Moves a task to an explicit target status along one machine edge.
pub async fn set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, task_id)): Path<(String, String)>,
    TeamId(team_id): TeamId,
    Json(body): Json<SetStatusRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task_id = parse_oid(&task_id, "task_id")?;
    transition(state, auth, team_id, task_id, body.status).await
}

/// Advances a task one step along the fixed cycle
/// closed → open → completed → closed.
pub async fn toggle(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, task_id)): Path<(String, String)>,
    TeamId(team_id): TeamId,
) -> Result<Json<TaskResponse>, ApiError> {
    state.teams.require_member(team_id, auth.user_id).await?;

    let task_id = parse_oid(&task_id, "task_id")?;
    let task = state.tasks.base.find_by_id_in_team(team_id, task_id).await?;
    transition(state, auth, team_id, task_id, task.status.next()).await
}

async fn transition(
    state: AppState,
    auth: AuthUser,
    team_id: ObjectId,
    task_id: ObjectId,
    to: TaskStatus,
) -> Result<Json<TaskResponse>, ApiError> {
    // Authorization precedes any state change; completing needs its own right.
    let team = state
        .teams
        .require_permission(team_id, auth.user_id, permission_for(to))
        .await?;

    let task = state
        .tasks
        .transition(team_id, task_id, to, auth.user_id)
        .await?;

    dispatcher::notify_team(
        &state.ws_storage,
        &team,
        "task:updated",
        serde_json::to_value(to_response(task.clone())).unwrap_or_default(),
    )
    .await;

    Ok(Json(to_response(task)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((_, task_id)): Path<(String, String)>,
    TeamId(team_id): TeamId,
) -> Result<Json<serde_json::Value>, ApiError> {
    let team = state
        .teams
        .require_permission(team_id, auth.user_id, Permission::DeleteTask)
        .await?;

    let task_id = parse_oid(&task_id, "task_id")?;
    state.tasks.delete(team_id, task_id).await?;

    dispatcher::notify_team(
        &state.ws_storage,
        &team,
        "task:deleted",
        serde_json::json!({ "task_id": task_id.to_hex() }),
    )
    .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

fn build_notification(
    kind: NotificationKind,
    date: Option<chrono::DateTime<Utc>>,
    interval: Option<NotificationInterval>,
    daily_time: Option<String>,
    trigger: Option<String>,
) -> Result<NotificationRule, ApiError> {
    match kind {
        NotificationKind::Never => Ok(NotificationRule::Never),
        NotificationKind::Once => {
            let date = date.ok_or_else(|| {
                ApiError::Validation("notification_date is required".to_string())
            })?;
            Ok(NotificationRule::Once {
                date: bson::DateTime::from_chrono(date),
            })
        }
        NotificationKind::Interval => {
            let interval = interval.ok_or_else(|| {
                ApiError::Validation("notification_interval is required".to_string())
            })?;
            Ok(NotificationRule::Interval { interval })
        }
        NotificationKind::Daily => {
            let time = daily_time.ok_or_else(|| {
                ApiError::Validation("notification_daily_time is required".to_string())
            })?;
            chrono::NaiveTime::parse_from_str(&time, "%H:%M").map_err(|_| {
                ApiError::Validation(
                    "notification_daily_time must be in HH:MM format".to_string(),
                )
            })?;
            Ok(NotificationRule::Daily { time })
        }
        NotificationKind::Trigger => {
            let trigger = trigger.ok_or_else(|| {
                ApiError::Validation("notification_trigger is required".to_string())
            })?;
            Ok(NotificationRule::Trigger {
                task_id: parse_oid(&trigger, "notification_trigger")?,
            })
        }
    }
}

fn parse_oid(value: &str, field: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(value).map_err(|_| ApiError::BadRequest(format!("Invalid {field}")))
}

fn parse_optional_oid(value: Option<&str>, field: &str) -> Result<Option<ObjectId>, ApiError> {
    match value {
        None | Some("") => Ok(None),
        Some(s) => Ok(Some(parse_oid(s, field)?)),
    }
}

fn parse_clearable_oid(value: &str, field: &str) -> Result<Option<ObjectId>, ApiError> {
    if value.is_empty() {
        Ok(None)
    } else {
        Ok(Some(parse_oid(value, field)?))
    }
}

fn parse_oids(values: &[String], field: &str) -> Result<Vec<ObjectId>, ApiError> {
    values.iter().map(|v| parse_oid(v, field)).collect()
}

fn to_response(task: Task) -> TaskResponse {
    let notification = match &task.notification {
        NotificationRule::Never => serde_json::json!({ "type": "never" }),
        NotificationRule::Once { date } => serde_json::json!({
            "type": "once",
            "date": date.try_to_rfc3339_string().unwrap_or_default(),
        }),
        NotificationRule::Interval { interval } => serde_json::json!({
            "type": "interval",
            "interval": serde_json::to_value(interval).unwrap_or_default(),
        }),
        NotificationRule::Daily { time } => serde_json::json!({
            "type": "daily",
            "time": time,
        }),
        NotificationRule::Trigger { task_id } => serde_json::json!({
            "type": "trigger",
            "task_id": task_id.to_hex(),
        }),
    };

    TaskResponse {
        id: task.id.unwrap().to_hex(),
        team_id: task.team_id.to_hex(),
        title: task.title,
        description: task.description,
        category_id: task.category_id.map(|id| id.to_hex()),
        assigned_to: task.assigned_to.map(|id| id.to_hex()),
        due_date: task
            .due_date
            .and_then(|d| d.try_to_rfc3339_string().ok()),
        priority: task.priority,
        status: task.status.as_str().to_string(),
        dependencies: task.dependencies.iter().map(|id| id.to_hex()).collect(),
        notification,
        created_by: task.created_by.to_hex(),
        created_at: task
            .created_at
            .try_to_rfc3339_string()
            .unwrap_or_default(),
    }
}
