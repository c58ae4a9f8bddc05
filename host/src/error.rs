//! Host error types.

use std::path::PathBuf;

/// Errors that can occur during host operations.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("instrument not registered: {0}")]
    NotRegistered(String),

    #[error("no price for {0}")]
    NoPrice(String),

    #[error("order error: {0}")]
    Order(String),

    #[error("market history error: {0}")]
    History(String),

    #[error("failed to read market history {path}: {source}")]
    HistoryRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse market history: {0}")]
    HistoryParse(#[from] serde_json::Error),
}
