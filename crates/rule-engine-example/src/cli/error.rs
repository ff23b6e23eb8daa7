use std::path::PathBuf;

use rule_engine::ConfigError;
use rule_engine_example::PlaceOrderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("failed to read order at '{path}'")]
    ReadOrder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed order at '{path}'")]
    ParseOrder {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid engine configuration")]
    Config(#[from] ConfigError),

    #[error("failed to start async runtime")]
    Runtime(#[source] std::io::Error),

    #[error(transparent)]
    PlaceOrder(#[from] PlaceOrderError),
}

pub(crate) type Result<T> = std::result::Result<T, CliError>;
