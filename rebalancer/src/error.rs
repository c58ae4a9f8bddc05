//! Error types for the rebalancer.

use std::path::PathBuf;

use screenbook::ParamsError;
use screenbook_host::HostError;

/// All errors that can occur during rebalancer operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid strategy parameters: {0}")]
    Params(#[from] ParamsError),

    #[error("market data error: {0}")]
    Data(String),

    #[error("host error: {0}")]
    Host(#[from] HostError),

    #[error("universe is empty after screening; nothing to schedule against")]
    EmptyUniverse,

    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
