/// Reward allocation: pool split, effective stakes, per-staker payouts.

pub mod allocator;
pub mod audit;
pub mod commission;
pub mod pools;
pub mod totals;

pub use allocator::{Allocation, RewardAllocator};
pub use audit::PayoutDetail;
pub use commission::{CommissionRate, NPS_COMMISSION_RATE};
pub use totals::PayoutTotals;
