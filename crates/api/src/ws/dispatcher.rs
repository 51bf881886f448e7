use axum::extract::ws::Message;
use bson::oid::ObjectId;
use futures::SinkExt;
use teamtask_db::models::Team;
use tracing::{debug, warn};

use super::storage::WsStorage;

/// Broadcasts a JSON message to all connections of the specified users.
pub async fn broadcast(
    ws_storage: &WsStorage,
    user_ids: &[ObjectId],
    message: &serde_json::Value,
) {
    let text = serde_json::to_string(message).unwrap_or_default();

    for user_id in user_ids {
        let senders = ws_storage.get_senders(user_id);
        for sender in senders {
            let text = text.clone();
            let mut guard = sender.lock().await;
            if let Err(e) = guard.send(Message::text(text)).await {
                warn!(?user_id, %e, "Failed to send WS message");
            } else {
                debug!(?user_id, "WS message sent");
            }
        }
    }
}

/// Pushes an event to every member of a team. Consumers must tolerate
/// duplicate and out-of-order delivery; mutations are guarded server-side.
pub async fn notify_team(
    ws_storage: &WsStorage,
    team: &Team,
    event_type: &str,
    data: serde_json::Value,
) {
    let member_ids: Vec<ObjectId> = team.members.iter().map(|m| m.user_id).collect();
    let message = serde_json::json!({
        "type": event_type,
        "data": data,
    });
    broadcast(ws_storage, &member_ids, &message).await;
}
