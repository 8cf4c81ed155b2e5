//! Commchain RPC: the `axum` HTTP surface fronting `commchain-core`.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use commchain_core::BlockLog;
use config::ServerConfig;
use state::AppState;

/// Builds the full router with `TokenGuard` applied to the write
/// endpoints listed in `SPEC_FULL.md` §6.
pub fn build_router(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/add_block", post(routes::blocks::add_block))
        .route("/upload_chain", post(routes::chain::upload_chain))
        .route("/shutdown", post(routes::admin::shutdown))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ));

    let open = Router::new()
        .route("/get_chain", get(routes::chain::get_chain))
        .route("/get_last_block", get(routes::blocks::get_last_block))
        .route("/validate_chain", get(routes::chain::validate_chain))
        .route(
            "/validate_transactions",
            get(routes::chain::validate_transactions),
        )
        .route("/download_chain", get(routes::files::download_chain))
        .route(
            "/download_transactions",
            get(routes::files::download_transactions),
        )
        .route("/get_balance", get(routes::balance::get_balance));

    guarded
        .merge(open)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Opens the configured `BlockLog` and serves the HTTP API until
/// `/shutdown` is called or the process receives ctrl-c.
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let blocklog = BlockLog::new(
        &config.ledger.block_log_path,
        &config.ledger.transactions_log_path,
    )
    .map_err(std::io::Error::other)?;

    let port = config.port;
    let state = AppState::new(blocklog, config);
    let shutdown = state.shutdown.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(%port, "commchain-rpc listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.notified().await;
            tracing::info!("graceful shutdown triggered");
        })
        .await
}
