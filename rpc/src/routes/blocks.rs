//! `/add_block` and `/get_last_block`.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use commchain_core::{Block, DataEntry, Error};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddBlockRequest {
    pub data: Vec<DataEntry>,
}

#[derive(Debug, Serialize)]
pub struct AddBlockResponse {
    pub message: String,
    pub block: Block,
}

pub async fn add_block(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddBlockRequest>,
) -> Result<Json<AddBlockResponse>, ApiError> {
    let block = state
        .blocklog
        .append(request.data, state.config.ledger.difficulty)?;
    tracing::info!(index = block.index, "block added via http");
    Ok(Json(AddBlockResponse {
        message: "Block added to the blockchain.".to_string(),
        block,
    }))
}

#[derive(Debug, Serialize)]
pub struct LastBlockResponse {
    pub block: Block,
}

pub async fn get_last_block(
    State(state): State<AppState>,
) -> Result<Json<LastBlockResponse>, ApiError> {
    let block = state
        .blocklog
        .last_block()?
        .ok_or_else(|| Error::NotFound("no blocks in the chain".to_string()))?;
    Ok(Json(LastBlockResponse { block }))
}
