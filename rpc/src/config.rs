//! `ServerConfig`: process-wide settings loaded once at startup.
//!
//! Grounded in `commchain_core::config::LedgerConfigBuilder`'s fluent
//! builder and in `original_source/sponsorblockchain_main.py`'s
//! `load_dotenv()` call at module import time.

use std::path::PathBuf;

use commchain_core::config::LedgerConfigBuilder;
use commchain_core::LedgerConfig;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "data";

/// Settings shared by every HTTP handler via `axum` `State`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_token: String,
    pub port: u16,
    pub log_filter: String,
    pub ledger: LedgerConfig,
}

/// Raised when required environment configuration is absent.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SERVER_TOKEN environment variable is required")]
    MissingToken,
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl ServerConfig {
    /// Loads configuration from an optional `.env` file and the process
    /// environment. Fails closed: refuses to start without `SERVER_TOKEN`
    /// rather than running with an empty token.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let server_token = std::env::var("SERVER_TOKEN").map_err(|_| ConfigError::MissingToken)?;
        if server_token.is_empty() {
            return Err(ConfigError::MissingToken);
        }

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT", raw))?,
            Err(_) => DEFAULT_PORT,
        };

        let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let difficulty = match std::env::var("LEDGER_DIFFICULTY") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("LEDGER_DIFFICULTY", raw))?,
            Err(_) => 0,
        };

        let data_dir = std::env::var("LEDGER_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        let data_dir = PathBuf::from(data_dir);

        let ledger = LedgerConfigBuilder::new()
            .block_log_path(data_dir.join("blockchain.json"))
            .transactions_log_path(data_dir.join("transactions.tsv"))
            .difficulty(difficulty)
            .finish();

        Ok(Self {
            server_token,
            port,
            log_filter,
            ledger,
        })
    }
}

/// Mirrors `obscura_core::config::ConfigBuilder`: lets tests construct a
/// `ServerConfig` without touching the real environment or `.env`.
pub struct ServerConfigBuilder {
    inner: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn new(server_token: impl Into<String>) -> Self {
        Self {
            inner: ServerConfig {
                server_token: server_token.into(),
                port: DEFAULT_PORT,
                log_filter: "info".to_string(),
                ledger: LedgerConfig::default(),
            },
        }
    }

    pub fn ledger(mut self, ledger: LedgerConfig) -> Self {
        self.inner.ledger = ledger;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.inner.port = port;
        self
    }

    pub fn finish(self) -> ServerConfig {
        self.inner
    }
}
