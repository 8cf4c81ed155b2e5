//! `/download_chain` and `/download_transactions`: stream a log file back
//! as an attachment, or 404 if it is missing.

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::Response;

use commchain_core::Error;

use crate::error::ApiError;
use crate::state::AppState;

async fn download_file(path: &std::path::Path, filename: &str) -> Result<Response, ApiError> {
    if !path.exists() {
        return Err(ApiError::NotFound(format!("{filename} not found")));
    }
    let contents = tokio::fs::read(path).await.map_err(Error::Io)?;
    Response::builder()
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(contents))
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

pub async fn download_chain(State(state): State<AppState>) -> Result<Response, ApiError> {
    download_file(state.blocklog.block_path(), "blockchain.json").await
}

pub async fn download_transactions(State(state): State<AppState>) -> Result<Response, ApiError> {
    download_file(state.blocklog.tx_log().path(), "transactions.tsv").await
}
