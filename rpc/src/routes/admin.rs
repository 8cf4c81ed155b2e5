//! `/shutdown`: notifies the graceful-shutdown future awaited in `main`.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn shutdown(State(state): State<AppState>) -> Json<MessageResponse> {
    tracing::info!("shutdown requested via http");
    state.shutdown.notify_one();
    Json(MessageResponse {
        message: "Server is shutting down.".to_string(),
    })
}
