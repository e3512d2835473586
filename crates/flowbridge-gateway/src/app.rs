use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use flowbridge_flowise::PredictionApi;
use flowbridge_teams::{ActivitySender, MessageRelay};

/// The relay as the gateway holds it: both collaborators behind trait objects
/// so tests can swap in fakes.
pub type Relay = MessageRelay<Arc<dyn PredictionApi>, Arc<dyn ActivitySender>>;

/// Central shared state, passed as `Arc<AppState>` to all Axum handlers.
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/api/messages", post(crate::http::messages::messages_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
