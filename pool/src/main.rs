// Delegation Payout - one payout run for a block producer
//
// Fetch blocks and staking ledgers, allocate rewards, write the transfer list
// and audit details, then send once the operator confirms the payout hash.

use anyhow::{bail, Context, Result};
use clap::Parser;
use payout_core::{CommissionRate, RewardAllocator};
use payout_pool::blockchain::{ArchiveClient, BlockDataProvider, GraphQLClient};
use payout_pool::config::Config;
use payout_pool::payment::{
    substitutions, PaymentBuilder, PaymentProcessor, RunOptions, ShareClassifier,
    TransactionBuilder,
};
use payout_pool::payout::{PoolWallet, SendOutcome, TransactionSender, TransactionWriter};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "payout-pool", version, about = "Delegation payout run for a block producer")]
struct Cli {
    /// Config file (defaults to PAYOUT_CONFIG or payout_config.json).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// First block height to pay.
    #[arg(long)]
    min_height: Option<u64>,

    /// Last block height to pay (capped by confirmations).
    #[arg(long)]
    max_height: Option<u64>,

    /// Pay the blocks of this epoch instead of a height range.
    #[arg(long, requires = "fork")]
    epoch: Option<u64>,

    /// Fork the epoch belongs to.
    #[arg(long, requires = "epoch")]
    fork: Option<u64>,

    /// Payout hash from a previous review run; sends when it matches.
    #[arg(long)]
    payout_hash: Option<String>,

    /// Write output files but never send.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("Payout run failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut cfg = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    if let Some(h) = cli.min_height { cfg.min_height = h; }
    if let Some(h) = cli.max_height { cfg.max_height = h; }
    if cli.payout_hash.is_some() { cfg.payout_hash = cli.payout_hash.clone(); }
    cfg.validate()?;

    tracing::info!("Payout config: {:?}", cfg);

    let timeout = Some(Duration::from_secs(cfg.request_timeout_secs));
    let archive = ArchiveClient::new(&cfg.archive_url, timeout)?;

    if let (Some(epoch), Some(fork)) = (cli.epoch, cli.fork) {
        let range = archive
            .epoch_heights(epoch, fork)
            .await
            .with_context(|| format!("failed to resolve epoch {} on fork {}", epoch, fork))?;
        tracing::info!("Epoch {} (fork {}) spans heights {}..={}", epoch, fork, range.min, range.max);
        cfg.min_height = range.min;
        cfg.max_height = range.max;
    }

    let commission = CommissionRate::new(cfg.commission_rate)?;
    let builder = PaymentBuilder::new(
        ArchiveClient::new(&cfg.archive_url, timeout)?,
        archive,
        RewardAllocator::new(commission),
        ShareClassifier::new(cfg.nps_public_keys.iter().cloned()),
        cfg.pool_public_key.clone(),
        cfg.min_confirmations,
    );

    let sender = if cfg.sender_secret_key.is_empty() {
        None
    } else {
        let wallet = PoolWallet::new(cfg.sender_secret_key.expose())?;
        if !cfg.sender_public_key.is_empty() && cfg.sender_public_key != wallet.public_key_hex {
            bail!("sender_public_key does not match the configured secret key");
        }
        Some(TransactionSender::new(
            GraphQLClient::new(&cfg.graphql_url, timeout),
            wallet,
            cfg.memo.clone(),
            cfg.data_dir.clone(),
            Duration::from_millis(cfg.send_interval_ms),
        ))
    };
    let sender_public_key = sender
        .as_ref()
        .map(|s| s.sender_public_key().to_string())
        .unwrap_or_else(|| cfg.sender_public_key.clone());

    let processor = PaymentProcessor::new(
        builder,
        substitutions::load(&cfg.substitution_file)?,
        cfg.payout_threshold,
        TransactionBuilder::new(cfg.default_fee),
        TransactionWriter::new(cfg.data_dir.clone()),
        sender,
        sender_public_key,
    );

    let outcome = processor
        .run(&RunOptions {
            min_height: cfg.min_height,
            max_height: cfg.max_height,
            payout_hash: cfg.payout_hash.clone(),
            dry_run: cli.dry_run,
        })
        .await?;

    match outcome.send {
        None => tracing::info!("Dry run complete, files in {}", cfg.data_dir.display()),
        Some(SendOutcome::Review { payout_hash }) => tracing::info!(
            "Review {} and rerun with --payout-hash {} to send",
            outcome.files.details.display(),
            payout_hash
        ),
        Some(SendOutcome::Sent { count, next_nonce, .. }) => {
            tracing::info!("Payout complete: {} transactions sent, next nonce {}", count, next_nonce)
        }
    }
    Ok(())
}
