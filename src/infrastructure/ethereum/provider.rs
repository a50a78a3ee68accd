//! Batcher client abstraction and its Alloy implementation
//!
//! Signing, nonce management and fee filling are left to Alloy's wallet
//! provider; this layer only exposes the handful of calls the tick cycle needs.

use std::fmt;
use std::time::Duration;

use alloy::eips::BlockNumberOrTag;
use alloy::network::{EthereumWallet, ReceiptResponse};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;

use crate::domain::IBatcher;
use crate::error::{Result, RpcResultExt, TickerError};

const RECEIPT_TIMEOUT: Duration = Duration::from_secs(600);

/// Connection settings for the batcher client
#[derive(Clone)]
pub struct ProviderConfig {
    /// HTTP JSON-RPC endpoint
    pub rpc_url: String,
    /// Hex private key; `None` uses a throwaway signer (read-only runs)
    pub private_key: Option<String>,
    pub batcher: Address,
}

impl ProviderConfig {
    /// Endpoint with any API key in the path masked
    pub fn display(&self) -> String {
        match self.rpc_url.parse::<Url>() {
            Ok(url) => redact_url(&url),
            Err(_) => "<invalid url>".to_string(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("rpc_url", &self.display())
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("batcher", &self.batcher)
            .finish()
    }
}

/// Summary of a mined tick transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub success: bool,
}

/// Operations the tick cycle performs against the chain
#[async_trait::async_trait]
pub trait BatcherClient: Send + Sync {
    /// Chain id reported by the node; doubles as the connectivity probe
    async fn chain_id(&self) -> Result<u64>;

    /// Account that signs tick transactions
    fn signer_address(&self) -> Address;

    fn batcher_address(&self) -> Address;

    /// Simulate `tick()` and return the pending amount it would release
    async fn pending_funds(&self) -> Result<U256>;

    async fn estimate_tick_gas(&self) -> Result<u64>;

    /// Gas limit of the latest block
    async fn block_gas_limit(&self) -> Result<u64>;

    /// Sign and broadcast `tick()` without waiting for inclusion
    async fn send_tick(&self, gas_limit: u64) -> Result<B256>;

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<ReceiptSummary>;

    fn endpoint_name(&self) -> String;
}

pub struct AlloyBatcherClient {
    contract: IBatcher::IBatcherInstance<DynProvider>,
    signer: Address,
    endpoint: String,
}

/// Build a signing HTTP client for the batcher
pub fn connect(config: ProviderConfig) -> Result<AlloyBatcherClient> {
    let signer: PrivateKeySigner = match config.private_key.as_deref() {
        Some(key) => key
            .trim()
            .parse()
            .map_err(|e| TickerError::InvalidPrivateKey(format!("{e}")))?,
        None => PrivateKeySigner::random(),
    };
    let signer_address = signer.address();

    let rpc_url: Url = config
        .rpc_url
        .parse()
        .map_err(|e| TickerError::InvalidUrl(format!("{e}")))?;
    let endpoint = redact_url(&rpc_url);
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(rpc_url)
        .erased();

    tracing::debug!(%endpoint, signer = %signer_address, "provider ready");

    Ok(AlloyBatcherClient {
        contract: IBatcher::new(config.batcher, provider),
        signer: signer_address,
        endpoint,
    })
}

#[async_trait::async_trait]
impl BatcherClient for AlloyBatcherClient {
    async fn chain_id(&self) -> Result<u64> {
        self.contract
            .provider()
            .get_chain_id()
            .await
            .map_err(|e| TickerError::NotConnected(format!("{} ({e})", self.endpoint)))
    }

    fn signer_address(&self) -> Address {
        self.signer
    }

    fn batcher_address(&self) -> Address {
        *self.contract.address()
    }

    async fn pending_funds(&self) -> Result<U256> {
        self.contract
            .tick()
            .from(self.signer)
            .call()
            .await
            .rpc_context("tick() call failed")
    }

    async fn estimate_tick_gas(&self) -> Result<u64> {
        self.contract
            .tick()
            .from(self.signer)
            .estimate_gas()
            .await
            .rpc_context("gas estimation failed")
    }

    async fn block_gas_limit(&self) -> Result<u64> {
        let block = self
            .contract
            .provider()
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .rpc_context("fetching latest block failed")?
            .ok_or_else(|| TickerError::Rpc("latest block not available".into()))?;
        Ok(block.header.gas_limit)
    }

    async fn send_tick(&self, gas_limit: u64) -> Result<B256> {
        let pending = self
            .contract
            .tick()
            .gas(gas_limit)
            .send()
            .await
            .rpc_context("sending tick() failed")?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<ReceiptSummary> {
        let root = self.contract.provider().root().clone();
        let receipt = PendingTransactionBuilder::new(root, tx_hash)
            .with_timeout(Some(RECEIPT_TIMEOUT))
            .get_receipt()
            .await
            .rpc_context("waiting for receipt failed")?;

        Ok(ReceiptSummary {
            tx_hash,
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
            success: receipt.status(),
        })
    }

    fn endpoint_name(&self) -> String {
        self.endpoint.clone()
    }
}

/// Mask credentials: the password and the last path segment (`.../v3/<key>`)
fn redact_url(url: &Url) -> String {
    let mut redacted = url.clone();
    let has_path = url
        .path_segments()
        .is_some_and(|mut segments| segments.any(|segment| !segment.is_empty()));
    if has_path {
        if let Ok(mut segments) = redacted.path_segments_mut() {
            segments.pop_if_empty().pop().push("***");
        }
    }
    if url.password().is_some() {
        let _ = redacted.set_password(Some("***"));
    }
    redacted.to_string()
}
