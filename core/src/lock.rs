//! Time-lock predicate.
//!
//! A staker is locked for a block while its vesting schedule has not yet
//! released the balance at that block's global slot. Locked winners send the
//! whole coinbase to the NPS pool; locked stakers earn nothing from the
//! supercharged pool.

use crate::types::{Block, Staker};

pub trait LockPolicy {
    fn is_locked(&self, staker: &Staker, block: &Block) -> bool;
}

/// Default policy: locked while `untimed_after_slot` is still ahead of the
/// block's global slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct UntimedAfterSlot;

impl LockPolicy for UntimedAfterSlot {
    fn is_locked(&self, staker: &Staker, block: &Block) -> bool {
        staker.untimed_after_slot > block.global_slot
    }
}

impl<F> LockPolicy for F
where
    F: Fn(&Staker, &Block) -> bool,
{
    fn is_locked(&self, staker: &Staker, block: &Block) -> bool {
        self(staker, block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShareClass;

    fn block_at(slot: u64) -> Block {
        Block {
            height: 1,
            date_time: 0,
            global_slot: slot,
            coinbase: Some(720_000_000_000),
            fee_transfer_to_receiver: 0,
            fee_transfer_from_coinbase: 0,
            user_command_transaction_fees: 0,
            creator_public_key: "c".into(),
            winner_public_key: "w".into(),
            state_hash: "s".into(),
            staking_ledger_hash: "l".into(),
        }
    }

    #[test]
    fn test_locked_until_slot_passes() {
        let staker = Staker::new("a", ShareClass::Common, 10, 1_000);
        assert!(UntimedAfterSlot.is_locked(&staker, &block_at(999)));
        assert!(!UntimedAfterSlot.is_locked(&staker, &block_at(1_000)));
        assert!(!UntimedAfterSlot.is_locked(&staker, &block_at(1_001)));
    }

    #[test]
    fn test_untimed_account_never_locked() {
        let staker = Staker::new("a", ShareClass::Common, 10, 0);
        assert!(!UntimedAfterSlot.is_locked(&staker, &block_at(0)));
    }

    #[test]
    fn test_closure_policy() {
        let always = |_: &Staker, _: &Block| true;
        let staker = Staker::new("a", ShareClass::Nps, 10, 0);
        assert!(always.is_locked(&staker, &block_at(5)));
    }
}
