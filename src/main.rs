mod config;
mod core;
mod domain;
mod error;
mod infrastructure;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::core::{TickOptions, TickOutcome, Ticker};
use crate::domain::{parse_batcher_address, Chain, DEFAULT_BATCHER_ADDRESS};
use crate::error::TickerError;
use crate::infrastructure::ethereum::connect;
use crate::infrastructure::ProviderConfig;

#[derive(Debug, Parser)]
#[command(
    name = "ticker",
    version,
    about = "Collect pending withdrawals waiting for l1_recipient"
)]
struct Args {
    /// Select Ethereum chain (default: mainnet)
    #[arg(long, value_enum)]
    chain: Option<Chain>,

    /// L1 withdrawal batching contract
    #[arg(long = "batcher_contract", alias = "batcher-contract", value_name = "ADDRESS")]
    batcher_contract: Option<String>,

    /// Full JSON-RPC URL, overrides the Infura endpoint (any chain id is accepted)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Read pending funds but never send a transaction
    #[arg(long)]
    dry_run: bool,

    /// Wait for the tick transaction to be mined
    #[arg(long)]
    wait: bool,

    /// Gas added on top of the node's estimate (default: 100000)
    #[arg(long)]
    gas_buffer: Option<u64>,

    /// Keep ticking every --interval seconds until interrupted
    #[arg(long)]
    watch: bool,

    /// Seconds between ticks in watch mode (default: 300)
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// Config file (default: ~/.config/ticker/config.toml)
    #[arg(long, env = "TICKER_CONFIG")]
    config: Option<PathBuf>,

    /// Private key used to sign the tick transaction
    #[arg(long, env = "PK", hide_env_values = true)]
    private_key: Option<String>,

    /// Infura project key
    #[arg(long, env = "INFURA_KEY", hide_env_values = true)]
    infura_key: Option<String>,
}

/// Everything needed to run, after merging flags, env and config
#[derive(Debug)]
struct Settings {
    chain: Chain,
    /// Chain id to enforce; unset for explicit RPC URLs
    expected_chain: Option<Chain>,
    provider: ProviderConfig,
    options: TickOptions,
    interval: Duration,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = config::load(args.config.as_deref());
    let settings = settings_from_args_and_config(&args, &config)?;
    tracing::debug!(?settings, "resolved settings");
    tracing::info!(
        chain = %settings.chain,
        endpoint = %settings.provider.display(),
        "starting"
    );

    let client = connect(settings.provider).context("Failed to create RPC client")?;
    let ticker = Ticker::new(Box::new(client), settings.options);
    ticker
        .check_connection(settings.expected_chain)
        .await
        .context("RPC connection check failed")?;

    let mut stdout = io::stdout();
    ticker.announce(&mut stdout)?;

    if args.watch {
        ticker
            .watch(&mut stdout, settings.interval, shutdown_signal())
            .await?;
    } else {
        match ticker.tick_once(&mut stdout).await? {
            TickOutcome::Idle => tracing::debug!("nothing pending"),
            TickOutcome::DryRun { pending } => tracing::info!(%pending, "dry run finished"),
            TickOutcome::Submitted {
                pending,
                tx_hash,
                receipt,
            } => match receipt {
                Some(receipt) => tracing::info!(
                    %pending,
                    tx_hash = %receipt.tx_hash,
                    block = ?receipt.block_number,
                    "tick mined"
                ),
                None => tracing::info!(%pending, %tx_hash, "tick submitted"),
            },
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("interrupt received");
}

fn settings_from_args_and_config(
    args: &Args,
    config: &config::Config,
) -> std::result::Result<Settings, TickerError> {
    // CLI arguments take precedence
    let chain = args.chain.or(config.chain).unwrap_or_default();

    let batcher = parse_batcher_address(
        args.batcher_contract
            .as_deref()
            .or(config.batcher_contract.as_deref())
            .unwrap_or(DEFAULT_BATCHER_ADDRESS),
    )?;

    let explicit_url =
        non_empty(args.rpc_url.as_deref()).or(non_empty(config.rpc_url.as_deref()));
    let rpc_url = match explicit_url {
        Some(url) => url.to_string(),
        None => {
            let key = non_empty(args.infura_key.as_deref())
                .or(non_empty(config.infura_key.as_deref()))
                .ok_or(TickerError::MissingEnv("INFURA_KEY"))?;
            chain.infura_url(key)
        }
    };

    let private_key = non_empty(args.private_key.as_deref()).map(str::to_string);
    if private_key.is_none() && !args.dry_run {
        return Err(TickerError::MissingEnv("PK"));
    }

    Ok(Settings {
        chain,
        expected_chain: explicit_url.is_none().then_some(chain),
        provider: ProviderConfig {
            rpc_url,
            private_key,
            batcher,
        },
        options: TickOptions {
            dry_run: args.dry_run,
            gas_buffer: args.gas_buffer.unwrap_or_else(|| config.gas_buffer()),
            wait_for_receipt: args.wait,
        },
        interval: Duration::from_secs(
            args.interval
                .filter(|secs| *secs > 0)
                .unwrap_or_else(|| config.interval_secs()),
        ),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
