//! Commission rates and the per-term floor.
//!
//! A payout term is `floor((1 - rate) * pool_reward * stake / pool_sum)`.
//! The rate is taken as the exact rational behind its decimal form
//! (`0.05` is `5/100`) and the pool reward is carried in half units, so the
//! whole term is evaluated in integers and floored once.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::pools::PoolReward;
use crate::error::{AllocationError, Result};

/// Fixed commission kept from NPS-class stakers (5%), independent of the
/// operator's own rate.
pub const NPS_COMMISSION_RATE: Decimal = dec!(0.05);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionRate(Decimal);

impl CommissionRate {
    pub fn new(rate: Decimal) -> Result<Self> {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(AllocationError::InvalidCommissionRate(rate));
        }
        Ok(Self(rate.normalize()))
    }

    pub fn nps() -> Self {
        Self(NPS_COMMISSION_RATE)
    }

    pub fn rate(&self) -> Decimal {
        self.0
    }

    /// `(1 - rate)` as `(numerator, denominator)`.
    fn retained(&self) -> (BigInt, BigInt) {
        let den = BigInt::from(10u8).pow(self.0.scale());
        let num = BigInt::from(self.0.mantissa());
        (&den - num, den)
    }

    /// Floored payout from one pool for one staker. A zero pool sum pays
    /// nothing.
    pub fn floor_share(&self, reward: PoolReward, stake: u64, pool_sum: u64) -> i128 {
        if pool_sum == 0 || stake == 0 {
            return 0;
        }
        let (keep_num, keep_den) = self.retained();
        let numerator = BigInt::from(reward.halves()) * keep_num * BigInt::from(stake);
        let denominator = BigInt::from(2u8) * keep_den * BigInt::from(pool_sum);

        // |term| <= |reward|, so it always fits back into i128
        floor_div(&numerator, &denominator).to_i128().unwrap_or_default()
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        Self(Decimal::ZERO)
    }
}

/// Division rounding toward negative infinity; `denominator` is positive.
fn floor_div(numerator: &BigInt, denominator: &BigInt) -> BigInt {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.is_negative() {
        quotient - 1
    } else {
        quotient
    }
}
