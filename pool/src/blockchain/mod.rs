/// Chain data access: the archive API for blocks and staking ledgers, and the
/// node GraphQL endpoint for nonces and payment submission.

pub mod archive;
pub mod graphql;

pub use archive::ArchiveClient;
pub use graphql::{GraphQLClient, PaymentNode};

use anyhow::Result;
use payout_core::Block;
use serde::{Deserialize, Serialize};

/// Inclusive height range of one epoch on one fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightRange {
    pub min: u64,
    pub max: u64,
}

/// One delegation as recorded in a staking ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub public_key: String,
    pub staking_balance: u64,
    #[serde(default)]
    pub untimed_after_slot: u64,
    /// Explicit share class label, if the ledger carries one
    #[serde(default)]
    pub share_class: Option<String>,
}

/// Staking-ledger snapshot for one ledger hash, restricted to the pool's
/// delegators.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingLedger {
    pub stakes: Vec<LedgerEntry>,
    pub total_staking_balance: u64,
}

#[allow(async_fn_in_trait)]
pub trait BlockDataProvider {
    async fn latest_height(&self) -> Result<u64>;

    async fn blocks(&self, key: &str, min_height: u64, max_height: u64) -> Result<Vec<Block>>;

    async fn epoch_heights(&self, epoch: u64, fork: u64) -> Result<HeightRange>;
}

#[allow(async_fn_in_trait)]
pub trait StakeDataProvider {
    async fn stakes(&self, ledger_hash: &str, key: &str) -> Result<StakingLedger>;
}
