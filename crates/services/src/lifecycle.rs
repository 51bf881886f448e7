//! Task state machine rules.
//!
//! Statuses cycle `closed → open → completed → closed`. The only edges
//! that exist are start (`closed→open`), finish (`open→completed`), close
//! (`open→closed`) and reopen (`completed→closed`); the toggle operation
//! simply follows `TaskStatus::next` one step along the cycle. Finishing
//! is additionally gated on every dependency being completed.

use bson::oid::ObjectId;
use teamtask_db::models::{Permission, Task, TaskStatus};

/// Whether `from → to` is an edge of the state machine.
pub fn is_valid_transition(from: TaskStatus, to: TaskStatus) -> bool {
    matches!(
        (from, to),
        (TaskStatus::Closed, TaskStatus::Open)
            | (TaskStatus::Open, TaskStatus::Completed)
            | (TaskStatus::Open, TaskStatus::Closed)
            | (TaskStatus::Completed, TaskStatus::Closed)
    )
}

/// Permission required to move a task onto `to`. Landing on `completed`
/// is its own capability; every other edge is a plain edit.
pub fn permission_for(to: TaskStatus) -> Permission {
    match to {
        TaskStatus::Completed => Permission::CompleteTask,
        TaskStatus::Open | TaskStatus::Closed => Permission::EditTask,
    }
}

/// Ids from `required` that are not satisfied by a completed task in
/// `loaded`. An id with no matching task counts as unmet: a dependency
/// that was deleted never satisfies the gate.
pub fn unmet_dependencies(required: &[ObjectId], loaded: &[Task]) -> Vec<ObjectId> {
    required
        .iter()
        .copied()
        .filter(|id| {
            !loaded
                .iter()
                .any(|t| t.id == Some(*id) && t.status == TaskStatus::Completed)
        })
        .collect()
}
