//! Allocation errors. Every variant is fatal for the whole run: no partial
//! payouts are returned and nothing derived from a failed run may be sent.

use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Reward pool named in an invariant failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Nps,
    Common,
    Supercharged,
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pool::Nps => write!(f, "NPS"),
            Pool::Common => write!(f, "Common"),
            Pool::Supercharged => write!(f, "Supercharged"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// Zero or several stakers carry the block winner's public key
    #[error("block {height}: expected exactly 1 staker for winner {winner}, found {matches}")]
    WinnerResolution {
        height: u64,
        winner: String,
        matches: usize,
    },

    /// Effective stake of a pool does not add up to its expected total
    #[error("block {height}: {pool} pool effective stake {actual} does not match expected {expected}")]
    PoolInvariance {
        height: u64,
        pool: Pool,
        expected: u128,
        actual: u128,
    },

    #[error("staker {public_key} has unknown share class {share_class:?}")]
    UnknownShareClass {
        public_key: String,
        share_class: String,
    },

    #[error("commission rate {0} is outside [0, 1]")]
    InvalidCommissionRate(Decimal),

    /// A payout amount does not fit the 64-bit ledger representation
    #[error("payout amount for {public_key} overflows 64 bits")]
    AmountOverflow { public_key: String },
}

pub type Result<T> = std::result::Result<T, AllocationError>;
