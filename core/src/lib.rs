//! Delegation Payout Core
//!
//! Pure reward-allocation engine for a delegated proof-of-stake block
//! producer. Blocks and a staking-ledger snapshot go in; per-staker payout
//! amounts and a full audit trail come out. No I/O happens in this crate.
//!
//! - [`reward`]: the three-pool allocator (NPS, Common, Supercharged)
//! - [`payout`]: the transfer-list finalizer (threshold, exclusion, substitution)
//! - [`lock`]: time-lock predicate used to decide supercharged eligibility

pub mod error;
pub mod lock;
pub mod payout;
pub mod reward;
pub mod types;

pub use error::{AllocationError, Pool};
pub use lock::{LockPolicy, UntimedAfterSlot};
pub use payout::{finalize, PayTo, SubstitutionRule, SubstitutionTable};
pub use reward::{Allocation, CommissionRate, PayoutDetail, PayoutTotals, RewardAllocator};
pub use types::{Block, PayoutTransaction, ShareClass, Staker};
