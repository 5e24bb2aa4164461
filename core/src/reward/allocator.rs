//! Three-pool reward allocator.
//!
//! ## Algorithm
//! For every block with a coinbase:
//! 1. Resolve the winner among the stakers (exactly one must match)
//! 2. Split the block income into NPS, Common and Supercharged pool rewards
//! 3. Accumulate effective stakes per pool and validate the pool sums
//! 4. Pay each staker its floored share of every pool it belongs to
//!
//! Blocks without a coinbase are recorded as processed and otherwise skipped.

use crate::error::{AllocationError, Result};
use crate::lock::{LockPolicy, UntimedAfterSlot};
use crate::types::{Block, PayoutTransaction, ShareClass, Staker};

use super::audit::PayoutDetail;
use super::commission::CommissionRate;
use super::pools::{weighting, EffectiveStake, PoolAccumulator, PoolSplit, PoolSums};
use super::totals::PayoutTotals;

/// Result of one allocation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub transactions: Vec<PayoutTransaction>,
    pub details: Vec<PayoutDetail>,
    pub processed_heights: Vec<u64>,
    pub total_payout: u64,
    pub totals: PayoutTotals,
}

pub struct RewardAllocator<L = UntimedAfterSlot> {
    commission: CommissionRate,
    nps_commission: CommissionRate,
    lock_policy: L,
}

impl RewardAllocator<UntimedAfterSlot> {
    pub fn new(commission: CommissionRate) -> Self {
        Self::with_lock_policy(commission, UntimedAfterSlot)
    }
}

impl<L: LockPolicy> RewardAllocator<L> {
    pub fn with_lock_policy(commission: CommissionRate, lock_policy: L) -> Self {
        Self {
            commission,
            nps_commission: CommissionRate::nps(),
            lock_policy,
        }
    }

    pub fn commission(&self) -> CommissionRate {
        self.commission
    }

    /// Allocate rewards for `blocks` starting from zero totals.
    pub fn allocate(
        &self,
        blocks: &[Block],
        stakers: &[Staker],
        total_stake: u64,
    ) -> Result<Allocation> {
        self.allocate_from(PayoutTotals::new(), blocks, stakers, total_stake)
    }

    /// Allocate rewards for `blocks` on top of `totals` carried in by the
    /// caller. Any error aborts the whole run.
    pub fn allocate_from(
        &self,
        mut totals: PayoutTotals,
        blocks: &[Block],
        stakers: &[Staker],
        total_stake: u64,
    ) -> Result<Allocation> {
        let mut processed_heights = Vec::with_capacity(blocks.len());
        let mut details = Vec::new();

        for block in blocks {
            processed_heights.push(block.height);

            let Some(coinbase) = block.reward_coinbase() else {
                tracing::debug!(height = block.height, "block has no coinbase, skipping");
                continue;
            };

            for detail in self.allocate_block(block, coinbase, stakers, total_stake)? {
                totals.add(&detail.public_key, detail.payout)?;
                details.push(detail);
            }
        }

        let (transactions, total_payout) = totals.transactions(stakers)?;

        tracing::info!(
            blocks = processed_heights.len(),
            details = details.len(),
            payees = transactions.len(),
            total_payout,
            "reward allocation complete"
        );

        Ok(Allocation {
            transactions,
            details,
            processed_heights,
            total_payout,
            totals,
        })
    }

    fn allocate_block(
        &self,
        block: &Block,
        coinbase: u64,
        stakers: &[Staker],
        total_stake: u64,
    ) -> Result<Vec<PayoutDetail>> {
        let winner = resolve_winner(block, stakers)?;
        let split = PoolSplit::for_block(block, coinbase, self.lock_policy.is_locked(winner, block));

        let mut pools = PoolAccumulator::with_capacity(stakers.len());
        for staker in stakers {
            pools.add(staker, self.lock_policy.is_locked(staker, block));
        }
        let sums = pools.validate(block.height, total_stake)?;

        let total_rewards = i64::try_from(split.total_rewards).map_err(|_| {
            AllocationError::AmountOverflow {
                public_key: block.winner_public_key.clone(),
            }
        })?;

        tracing::debug!(
            height = block.height,
            winner = %block.winner_public_key,
            total_rewards,
            nps_pool = %split.nps.to_decimal(),
            common_pool = %split.common.to_decimal(),
            supercharged_pool = %split.supercharged.to_decimal(),
            "allocating block"
        );

        stakers
            .iter()
            .zip(pools.stakes())
            .map(|(staker, stake)| -> Result<PayoutDetail> {
                let payout = self.payout(staker, &split, stake, &sums)?;
                Ok(PayoutDetail {
                    public_key: staker.public_key.clone(),
                    block_height: block.height,
                    global_slot: block.global_slot,
                    public_key_untimed_after: staker.untimed_after_slot,
                    share_class: staker.share_class.clone(),
                    state_hash: block.state_hash.clone(),
                    staking_balance: staker.staking_balance,
                    effective_nps_pool_weighting: weighting(stake.nps, sums.nps),
                    effective_nps_pool_stakes: stake.nps,
                    effective_common_pool_weighting: weighting(stake.common, sums.common),
                    effective_common_pool_stakes: stake.common,
                    effective_supercharged_pool_weighting: weighting(
                        stake.supercharged,
                        sums.supercharged,
                    ),
                    effective_supercharged_pool_stakes: stake.supercharged,
                    sum_effective_nps_pool_stakes: sums.nps,
                    sum_effective_common_pool_stakes: sums.common,
                    sum_effective_supercharged_pool_stakes: sums.supercharged,
                    date_time: block.date_time,
                    coinbase,
                    total_rewards,
                    total_rewards_nps_pool: split.nps.to_decimal(),
                    total_rewards_common_pool: split.common.to_decimal(),
                    total_rewards_supercharged_pool: split.supercharged.to_decimal(),
                    payout,
                })
            })
            .collect()
    }

    /// Each pool term is floored on its own before the terms are summed.
    fn payout(
        &self,
        staker: &Staker,
        split: &PoolSplit,
        stake: &EffectiveStake,
        sums: &PoolSums,
    ) -> Result<i64> {
        let payout = match &staker.share_class {
            ShareClass::Common => {
                self.commission.floor_share(split.nps, stake.nps, sums.nps)
                    + self.commission.floor_share(split.common, stake.common, sums.common)
                    + self.commission.floor_share(
                        split.supercharged,
                        stake.supercharged,
                        sums.supercharged,
                    )
            }
            ShareClass::Nps => self.nps_commission.floor_share(split.nps, stake.nps, sums.nps),
            ShareClass::Other(label) => {
                return Err(AllocationError::UnknownShareClass {
                    public_key: staker.public_key.clone(),
                    share_class: label.clone(),
                })
            }
        };

        i64::try_from(payout).map_err(|_| AllocationError::AmountOverflow {
            public_key: staker.public_key.clone(),
        })
    }
}

fn resolve_winner<'a>(block: &Block, stakers: &'a [Staker]) -> Result<&'a Staker> {
    let mut matches = stakers
        .iter()
        .filter(|s| s.public_key == block.winner_public_key);

    match (matches.next(), matches.count()) {
        (Some(winner), 0) => Ok(winner),
        (first, rest) => Err(AllocationError::WinnerResolution {
            height: block.height,
            winner: block.winner_public_key.clone(),
            matches: usize::from(first.is_some()) + rest,
        }),
    }
}
