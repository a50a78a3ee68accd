//! The tick cycle: read pending funds, flush them if there are any

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use alloy::primitives::{B256, U256};
use tracing::{debug, error, info, warn};

use crate::domain::{display_amount, Chain};
use crate::error::{Result, TickerError};
use crate::infrastructure::{BatcherClient, ReceiptSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOptions {
    /// Read only; never broadcast
    pub dry_run: bool,
    /// Gas added on top of the node's estimate
    pub gas_buffer: u64,
    pub wait_for_receipt: bool,
}

/// What a single cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    DryRun {
        pending: U256,
    },
    Submitted {
        pending: U256,
        tx_hash: B256,
        receipt: Option<ReceiptSummary>,
    },
}

pub struct Ticker {
    client: Box<dyn BatcherClient>,
    options: TickOptions,
}

impl Ticker {
    pub fn new(client: Box<dyn BatcherClient>, options: TickOptions) -> Self {
        Self { client, options }
    }

    /// Verify the node answers and, when `expected` is set, serves that chain.
    ///
    /// `None` accepts any chain id (custom RPC endpoints, local forks).
    pub async fn check_connection(&self, expected: Option<Chain>) -> Result<u64> {
        let actual = self.client.chain_id().await?;
        if let Some(chain) = expected {
            if actual != chain.chain_id() {
                return Err(TickerError::ChainMismatch {
                    expected: chain.chain_id(),
                    actual,
                });
            }
        }
        info!(chain_id = actual, endpoint = %self.client.endpoint_name(), "connected");
        Ok(actual)
    }

    /// Print the signing account and the batcher being ticked
    pub fn announce<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(
            out,
            "{} {}",
            self.client.signer_address().to_checksum(None),
            self.client.batcher_address().to_checksum(None)
        )?;
        Ok(())
    }

    pub async fn tick_once<W: Write + Send>(&self, out: &mut W) -> Result<TickOutcome> {
        let pending = self.client.pending_funds().await?;
        if pending.is_zero() {
            writeln!(out, "nothing to tick")?;
            debug!("no pending withdrawals");
            return Ok(TickOutcome::Idle);
        }

        writeln!(out, "Awaiting {} withdrawal waiting.", display_amount(pending))?;

        if self.options.dry_run {
            info!(%pending, "dry run, not sending tick");
            return Ok(TickOutcome::DryRun { pending });
        }

        let gas_limit = self.gas_limit().await?;
        let tx_hash = self.client.send_tick(gas_limit).await?;
        info!(%tx_hash, gas_limit, "tick sent");
        writeln!(out, "Pending withdrawal collected, tx hash: {tx_hash}")?;

        let receipt = if self.options.wait_for_receipt {
            let receipt = self.client.wait_for_receipt(tx_hash).await?;
            if !receipt.success {
                return Err(TickerError::Reverted(tx_hash));
            }
            match receipt.block_number {
                Some(block) => writeln!(
                    out,
                    "Tick confirmed in block {block} (gas used {})",
                    receipt.gas_used
                )?,
                None => writeln!(out, "Tick confirmed (gas used {})", receipt.gas_used)?,
            }
            Some(receipt)
        } else {
            None
        };

        Ok(TickOutcome::Submitted {
            pending,
            tx_hash,
            receipt,
        })
    }

    /// Node estimate plus the buffer, capped at the latest block's gas limit
    async fn gas_limit(&self) -> Result<u64> {
        let estimate = self.client.estimate_tick_gas().await?;
        let block_limit = self.client.block_gas_limit().await?;
        if estimate > block_limit {
            return Err(TickerError::GasAboveBlockLimit {
                estimate,
                block_limit,
            });
        }
        let gas_limit = estimate.saturating_add(self.options.gas_buffer).min(block_limit);
        debug!(estimate, block_limit, gas_limit, "gas limit");
        Ok(gas_limit)
    }

    /// Repeat the cycle every `interval` until `shutdown` resolves.
    ///
    /// A failed cycle is logged and the loop carries on, except when the output
    /// can no longer be written, which ends the loop with the error. Returns the
    /// number of cycles run.
    pub async fn watch<W, F>(
        &self,
        out: &mut W,
        interval: Duration,
        shutdown: F,
    ) -> Result<u64>
    where
        W: Write + Send,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0u64;

        info!(interval_secs = interval.as_secs(), "watching batcher");
        loop {
            cycles += 1;
            match self.tick_once(out).await {
                Ok(TickOutcome::Submitted { tx_hash, .. }) => {
                    debug!(cycle = cycles, %tx_hash, "cycle submitted tick")
                }
                Ok(_) => debug!(cycle = cycles, "cycle done"),
                Err(TickerError::Output(err)) => {
                    warn!(cycle = cycles, "output closed, stopping: {err}");
                    return Err(TickerError::Output(err));
                }
                Err(err) => error!(cycle = cycles, "tick cycle failed: {err}"),
            }

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        info!(cycles, "stopped watching");
        Ok(cycles)
    }
}
