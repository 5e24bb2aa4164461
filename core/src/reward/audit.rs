//! Audit records: one snapshot per staker per reward-bearing block.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ShareClass;

/// Every intermediate value behind one staker's payout for one block.
///
/// The ordered sequence of details is the audit ledger for a run; the
/// payout hash that gates sending is computed over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutDetail {
    pub public_key: String,
    pub block_height: u64,
    pub global_slot: u64,
    pub public_key_untimed_after: u64,
    pub share_class: ShareClass,
    pub state_hash: String,
    pub staking_balance: u64,

    #[serde(rename = "effectiveNPSPoolWeighting")]
    pub effective_nps_pool_weighting: Decimal,
    #[serde(rename = "effectiveNPSPoolStakes")]
    pub effective_nps_pool_stakes: u64,
    pub effective_common_pool_weighting: Decimal,
    pub effective_common_pool_stakes: u64,
    pub effective_supercharged_pool_weighting: Decimal,
    pub effective_supercharged_pool_stakes: u64,

    #[serde(rename = "sumEffectiveNPSPoolStakes")]
    pub sum_effective_nps_pool_stakes: u64,
    pub sum_effective_common_pool_stakes: u64,
    pub sum_effective_supercharged_pool_stakes: u64,

    pub date_time: i64,
    pub coinbase: u64,
    pub total_rewards: i64,
    #[serde(rename = "totalRewardsNPSPool")]
    pub total_rewards_nps_pool: Decimal,
    pub total_rewards_common_pool: Decimal,
    pub total_rewards_supercharged_pool: Decimal,

    pub payout: i64,
}
