use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub team_id: ObjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<ObjectId>,
    /// `None` assigns the task to the whole team.
    pub assigned_to: Option<ObjectId>,
    pub due_date: Option<DateTime>,
    /// "Important" flag; doubles the completion award.
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub status: TaskStatus,
    /// Ids of tasks that must be completed before this one can be.
    /// Never contains the task's own id.
    #[serde(default)]
    pub dependencies: Vec<ObjectId>,
    #[serde(default)]
    pub notification: NotificationRule,
    pub created_by: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Closed,
    Open,
    Completed,
}

impl TaskStatus {
    /// Successor in the fixed toggle cycle closed → open → completed → closed.
    pub fn next(self) -> TaskStatus {
        match self {
            TaskStatus::Closed => TaskStatus::Open,
            TaskStatus::Open => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Closed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Closed => "closed",
            TaskStatus::Open => "open",
            TaskStatus::Completed => "completed",
        }
    }
}

/// Describes a desired notification for a task. Only the descriptor is
/// stored; scheduling and delivery belong to an external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationRule {
    #[default]
    Never,
    Once {
        date: DateTime,
    },
    Interval {
        interval: NotificationInterval,
    },
    Daily {
        /// Wall-clock time of day, "HH:MM".
        time: String,
    },
    Trigger {
        task_id: ObjectId,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationInterval {
    Daily,
    Weekly,
    Monthly,
}

impl Task {
    pub const COLLECTION: &'static str = "tasks";
}
