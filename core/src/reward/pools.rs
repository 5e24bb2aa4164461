//! Pool reward split and effective-stake accumulation for a single block.

use rust_decimal::Decimal;
use std::ops::Sub;

use crate::error::{AllocationError, Pool, Result};
use crate::types::{Block, ShareClass, Staker};

// ---------------------------------------------------------------------------
// Pool rewards
// ---------------------------------------------------------------------------

/// A pool reward in half units, so that splitting an odd coinbase in two
/// stays exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolReward {
    halves: i128,
}

impl PoolReward {
    pub const ZERO: PoolReward = PoolReward { halves: 0 };

    pub fn whole(units: i128) -> Self {
        Self { halves: units * 2 }
    }

    /// Half of `units`.
    pub fn half_of(units: u64) -> Self {
        Self {
            halves: i128::from(units),
        }
    }

    pub fn halves(&self) -> i128 {
        self.halves
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::from_i128_with_scale(self.halves * 5, 1).normalize()
    }
}

impl Sub for PoolReward {
    type Output = PoolReward;

    fn sub(self, rhs: PoolReward) -> PoolReward {
        PoolReward {
            halves: self.halves - rhs.halves,
        }
    }
}

/// How one block's income is divided between the three pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSplit {
    /// coinbase + fee transfer to receiver - fee transfer from coinbase
    pub total_rewards: i128,
    pub nps: PoolReward,
    pub common: PoolReward,
    pub supercharged: PoolReward,
}

impl PoolSplit {
    /// A locked winner sends the whole coinbase to the NPS pool; otherwise it
    /// is halved between NPS and Supercharged. Whatever is left of the block
    /// income (the fee transfers) goes to the Common pool.
    pub fn for_block(block: &Block, coinbase: u64, winner_locked: bool) -> Self {
        let total_rewards = i128::from(coinbase) + i128::from(block.fee_transfer_to_receiver)
            - i128::from(block.fee_transfer_from_coinbase);

        let (nps, supercharged) = if winner_locked {
            (PoolReward::whole(i128::from(coinbase)), PoolReward::ZERO)
        } else {
            (PoolReward::half_of(coinbase), PoolReward::half_of(coinbase))
        };
        let common = PoolReward::whole(total_rewards) - nps - supercharged;

        Self {
            total_rewards,
            nps,
            common,
            supercharged,
        }
    }
}

// ---------------------------------------------------------------------------
// Effective stakes
// ---------------------------------------------------------------------------

/// A staker's stake as counted by each pool for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectiveStake {
    pub nps: u64,
    pub common: u64,
    pub supercharged: u64,
}

impl EffectiveStake {
    /// Every staker counts fully in the NPS pool. Only Common-class stakers
    /// count in the Common pool, and of those only the unlocked ones count in
    /// the Supercharged pool.
    pub fn of(staker: &Staker, locked: bool) -> Self {
        let common = match staker.share_class {
            ShareClass::Common => staker.staking_balance,
            _ => 0,
        };
        Self {
            nps: staker.staking_balance,
            common,
            supercharged: if locked { 0 } else { common },
        }
    }
}

/// Validated pool-wide effective stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolSums {
    pub nps: u64,
    pub common: u64,
    pub supercharged: u64,
}

/// Per-block accumulator. Breakdown entries are kept in staker order.
#[derive(Debug, Default)]
pub struct PoolAccumulator {
    nps_sum: u128,
    common_sum: u128,
    supercharged_sum: u128,
    unweighted_common: u128,
    stakes: Vec<EffectiveStake>,
}

impl PoolAccumulator {
    pub fn with_capacity(stakers: usize) -> Self {
        Self {
            stakes: Vec::with_capacity(stakers),
            ..Self::default()
        }
    }

    pub fn add(&mut self, staker: &Staker, locked: bool) {
        let stake = EffectiveStake::of(staker, locked);
        self.nps_sum += u128::from(stake.nps);
        self.common_sum += u128::from(stake.common);
        self.supercharged_sum += u128::from(stake.supercharged);
        if staker.share_class == ShareClass::Common {
            self.unweighted_common += u128::from(staker.staking_balance);
        }
        self.stakes.push(stake);
    }

    pub fn stakes(&self) -> &[EffectiveStake] {
        &self.stakes
    }

    /// Checks the NPS sum against the ledger's total stake and the Common sum
    /// against the Common-class balances.
    pub fn validate(&self, height: u64, total_stake: u64) -> Result<PoolSums> {
        check(height, Pool::Nps, u128::from(total_stake), self.nps_sum)?;
        check(height, Pool::Common, self.unweighted_common, self.common_sum)?;

        Ok(PoolSums {
            nps: total_stake,
            common: narrow(height, Pool::Common, self.common_sum)?,
            supercharged: narrow(height, Pool::Supercharged, self.supercharged_sum)?,
        })
    }
}

fn check(height: u64, pool: Pool, expected: u128, actual: u128) -> Result<()> {
    if expected != actual {
        return Err(AllocationError::PoolInvariance {
            height,
            pool,
            expected,
            actual,
        });
    }
    Ok(())
}

fn narrow(height: u64, pool: Pool, sum: u128) -> Result<u64> {
    u64::try_from(sum).map_err(|_| AllocationError::PoolInvariance {
        height,
        pool,
        expected: u128::from(u64::MAX),
        actual: sum,
    })
}

/// `stake / sum`, or zero for an empty pool.
pub fn weighting(stake: u64, sum: u64) -> Decimal {
    if sum == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(stake)
        .checked_div(Decimal::from(sum))
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn block(fee_in: u64, fee_out: u64) -> Block {
        Block {
            height: 10,
            date_time: 0,
            global_slot: 100,
            coinbase: Some(720_000_000_000),
            fee_transfer_to_receiver: fee_in,
            fee_transfer_from_coinbase: fee_out,
            user_command_transaction_fees: fee_in,
            creator_public_key: "c".into(),
            winner_public_key: "w".into(),
            state_hash: "s".into(),
            staking_ledger_hash: "l".into(),
        }
    }

    #[test]
    fn test_split_locked_winner() {
        let split = PoolSplit::for_block(&block(10_000_000, 0), 720_000_000_000, true);
        assert_eq!(split.total_rewards, 720_010_000_000);
        assert_eq!(split.nps, PoolReward::whole(720_000_000_000));
        assert_eq!(split.supercharged, PoolReward::ZERO);
        assert_eq!(split.common, PoolReward::whole(10_000_000));
    }

    #[test]
    fn test_split_unlocked_winner() {
        let split = PoolSplit::for_block(&block(10_000_000, 0), 720_000_000_000, false);
        assert_eq!(split.nps.to_decimal(), dec!(360000000000));
        assert_eq!(split.supercharged.to_decimal(), dec!(360000000000));
        assert_eq!(split.common.to_decimal(), dec!(10000000));
    }

    #[test]
    fn test_split_odd_coinbase_is_exact() {
        let split = PoolSplit::for_block(&block(0, 0), 3, false);
        assert_eq!(split.nps.to_decimal(), dec!(1.5));
        assert_eq!(split.supercharged.to_decimal(), dec!(1.5));
        assert_eq!(split.common, PoolReward::ZERO);
    }

    #[test]
    fn test_common_pool_negative_when_fees_leave_coinbase() {
        let split = PoolSplit::for_block(&block(1_000, 5_000), 720_000_000_000, true);
        assert_eq!(split.common, PoolReward::whole(-4_000));
    }

    #[test]
    fn test_effective_stakes() {
        let common = Staker::new("a", ShareClass::Common, 100, 0);
        let nps = Staker::new("b", ShareClass::Nps, 50, 0);

        assert_eq!(
            EffectiveStake::of(&common, false),
            EffectiveStake { nps: 100, common: 100, supercharged: 100 }
        );
        assert_eq!(
            EffectiveStake::of(&common, true),
            EffectiveStake { nps: 100, common: 100, supercharged: 0 }
        );
        assert_eq!(
            EffectiveStake::of(&nps, false),
            EffectiveStake { nps: 50, common: 0, supercharged: 0 }
        );
    }

    #[test]
    fn test_accumulator_validates_total_stake() {
        let mut acc = PoolAccumulator::with_capacity(2);
        acc.add(&Staker::new("a", ShareClass::Common, 100, 0), false);
        acc.add(&Staker::new("b", ShareClass::Nps, 50, 0), false);

        let sums = acc.validate(10, 150).unwrap();
        assert_eq!(sums, PoolSums { nps: 150, common: 100, supercharged: 100 });

        let err = acc.validate(10, 151).unwrap_err();
        assert_eq!(
            err,
            AllocationError::PoolInvariance {
                height: 10,
                pool: Pool::Nps,
                expected: 151,
                actual: 150,
            }
        );
    }

    #[test]
    fn test_weighting() {
        assert_eq!(weighting(1, 4), dec!(0.25));
        assert_eq!(weighting(5, 0), Decimal::ZERO);
    }
}
