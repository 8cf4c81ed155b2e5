//! `TokenGuard`: bearer-secret middleware applied to write endpoints.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

/// Rejects the request with [`ApiError::Auth`] unless the `token` header
/// matches `ServerConfig::server_token` exactly. Simple equality is
/// sufficient here: the token is a shared operator secret, not a
/// timing-attack-sensitive credential (see `SPEC_FULL.md` §6a).
pub async fn require_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = headers
        .get("token")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if provided.is_empty() || provided != state.config.server_token {
        return Err(ApiError::Auth);
    }

    Ok(next.run(request).await)
}
