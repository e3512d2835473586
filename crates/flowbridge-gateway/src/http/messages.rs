//! Bot Framework ingress, POST /api/messages.
//!
//! The activity is acknowledged as soon as it parses; the prediction call and
//! the reply happen on a spawned task so the channel never waits on Flowise.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use flowbridge_teams::Activity;

use crate::app::AppState;

/// POST /api/messages
///
/// Returns 200 `{}` for any well-formed activity and 400 when the body is
/// not a JSON activity.
pub async fn messages_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let activity: Activity = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "invalid activity body");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid activity body"})),
        )
    })?;

    let receipt_id = uuid::Uuid::new_v4().to_string();
    info!(
        receipt_id = %receipt_id,
        kind = %activity.kind,
        conversation = activity.conversation_id().unwrap_or("-"),
        "activity received"
    );

    let relay = Arc::clone(&state.relay);
    tokio::spawn(async move {
        let outcome = relay.handle(&activity).await;
        debug!(receipt_id = %receipt_id, ?outcome, "activity processed");
    });

    Ok(Json(json!({})))
}
