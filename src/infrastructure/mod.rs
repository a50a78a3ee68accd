//! Infrastructure layer - External service integrations
//!
//! Currently just the signed JSON-RPC client for the batcher contract.

pub mod ethereum;

pub use ethereum::{BatcherClient, ProviderConfig, ReceiptSummary};
