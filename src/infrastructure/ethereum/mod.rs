//! Ethereum infrastructure - Alloy-backed batcher client

mod provider;

pub use provider::{connect, BatcherClient, ProviderConfig, ReceiptSummary};
