//! Error taxonomy for the tick cycle

use alloy::primitives::B256;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TickerError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("invalid RPC URL {0:?}")]
    InvalidUrl(String),

    #[error("RPC node is not reachable: {0}")]
    NotConnected(String),

    #[error("connected to chain {actual}, expected {expected}")]
    ChainMismatch { expected: u64, actual: u64 },

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("gas estimate {estimate} exceeds block gas limit {block_limit}")]
    GasAboveBlockLimit { estimate: u64, block_limit: u64 },

    #[error("tick transaction {0} reverted")]
    Reverted(B256),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TickerError>;

/// Wraps library errors into `TickerError::Rpc` with a short prefix.
pub trait RpcResultExt<T> {
    fn rpc_context(self, what: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> RpcResultExt<T> for std::result::Result<T, E> {
    fn rpc_context(self, what: &str) -> Result<T> {
        self.map_err(|e| TickerError::Rpc(format!("{what}: {e}")))
    }
}
