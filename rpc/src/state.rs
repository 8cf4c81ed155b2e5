//! Shared application state injected into every handler.

use std::sync::Arc;

use commchain_core::BlockLog;
use tokio::sync::Notify;

use crate::config::ServerConfig;

/// Cloned (cheaply, via `Arc`) into every request. Holds the single
/// `BlockLog` instance, the loaded `ServerConfig`, and the shutdown
/// notifier `/shutdown` signals.
#[derive(Clone)]
pub struct AppState {
    pub blocklog: Arc<BlockLog>,
    pub config: Arc<ServerConfig>,
    pub shutdown: Arc<Notify>,
}

impl AppState {
    pub fn new(blocklog: BlockLog, config: ServerConfig) -> Self {
        Self {
            blocklog: Arc::new(blocklog),
            config: Arc::new(config),
            shutdown: Arc::new(Notify::new()),
        }
    }
}
