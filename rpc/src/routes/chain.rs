//! `/get_chain`, `/upload_chain`, `/validate_chain`, `/validate_transactions`.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use commchain_core::{is_chain_valid, reconcile, Block, Error};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChainResponse {
    pub length: u64,
    pub chain: Vec<Block>,
}

pub async fn get_chain(State(state): State<AppState>) -> Result<Json<ChainResponse>, ApiError> {
    let chain: Vec<Block> = state
        .blocklog
        .iter_blocks()?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(ChainResponse {
        length: chain.len() as u64,
        chain,
    }))
}

/// Replaces `data/blockchain.json` wholesale with the uploaded bytes.
/// Does not re-derive the transactions file; operators are expected to
/// run `/validate_transactions?repair=true&force=true` afterward.
pub async fn upload_chain(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let _guard = state
        .blocklog
        .write_lock()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    std::fs::write(state.blocklog.block_path(), &body).map_err(Error::Io)?;
    tracing::info!(bytes = body.len(), "blockchain file replaced via upload");
    Ok(Json(serde_json::json!({
        "message": "Blockchain file uploaded. Run /validate_transactions to repair the transactions file.",
    })))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn validate_chain(State(state): State<AppState>) -> Json<MessageResponse> {
    let message = if is_chain_valid(&state.blocklog).unwrap_or(false) {
        "The blockchain is valid."
    } else {
        "The blockchain is not valid."
    };
    Json(MessageResponse {
        message: message.to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ValidateTransactionsQuery {
    #[serde(default)]
    pub repair: bool,
    #[serde(default)]
    pub force: bool,
}

pub async fn validate_transactions(
    State(state): State<AppState>,
    Query(query): Query<ValidateTransactionsQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let report = reconcile(
        &state.blocklog,
        state.blocklog.tx_log(),
        query.repair,
        query.force,
    )?;
    if !report.valid {
        return Err(ApiError::BadRequest(report.message));
    }
    Ok(Json(MessageResponse {
        message: report.message,
    }))
}
