//! Reward Allocation Integration Tests
//!
//! Validates:
//! 1. Blocks without coinbase are processed but pay nothing
//! 2. Pool invariants abort the run with no output
//! 3. NPS-class payouts ignore the operator commission
//! 4. Floored terms never exceed their pool reward
//! 5. End-to-end split of a locked-winner block between equal stakers

use payout_core::reward::pools::PoolSplit;
use payout_core::{
    AllocationError, Block, CommissionRate, PayoutTotals, Pool, RewardAllocator, ShareClass,
    Staker,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const COINBASE: u64 = 720_000_000_000;

fn make_block(height: u64, coinbase: Option<u64>, winner: &str, global_slot: u64) -> Block {
    Block {
        height,
        date_time: 1_615_939_560_000 + height as i64 * 180_000,
        global_slot,
        coinbase,
        fee_transfer_to_receiver: 10_000_000,
        fee_transfer_from_coinbase: 0,
        user_command_transaction_fees: 10_000_000,
        creator_public_key: "B62creator".to_string(),
        winner_public_key: winner.to_string(),
        state_hash: format!("3NLstate{}", height),
        staking_ledger_hash: "jxledger".to_string(),
    }
}

fn common(pk: &str, balance: u64) -> Staker {
    Staker::new(pk, ShareClass::Common, balance, 0)
}

fn nps(pk: &str, balance: u64) -> Staker {
    Staker::new(pk, ShareClass::Nps, balance, 0)
}

fn total_stake(stakers: &[Staker]) -> u64 {
    stakers.iter().map(|s| s.staking_balance).sum()
}

fn allocator(rate: Decimal) -> RewardAllocator {
    RewardAllocator::new(CommissionRate::new(rate).unwrap())
}

// =========================================================================
// 1. Blocks without coinbase
// =========================================================================

#[test]
fn test_zero_and_missing_coinbase_blocks_are_processed_only() {
    let stakers = vec![common("B62a", 1_000), common("B62b", 1_000)];
    let blocks = vec![
        make_block(10, Some(0), "B62a", 100),
        make_block(11, None, "B62nobody", 101),
    ];

    let result = allocator(dec!(0.05))
        .allocate(&blocks, &stakers, total_stake(&stakers))
        .unwrap();

    assert_eq!(result.processed_heights, vec![10, 11]);
    assert!(result.details.is_empty());
    assert!(result.transactions.is_empty());
    assert_eq!(result.total_payout, 0);
    assert_eq!(result.totals.get("B62a"), 0);
}

#[test]
fn test_empty_stakers_allowed_without_rewards() {
    let blocks = vec![make_block(10, None, "B62a", 100)];
    let result = allocator(dec!(0)).allocate(&blocks, &[], 0).unwrap();
    assert_eq!(result.processed_heights, vec![10]);
}

#[test]
fn test_empty_stakers_with_reward_fails_winner_resolution() {
    let blocks = vec![make_block(10, Some(COINBASE), "B62a", 100)];
    let err = allocator(dec!(0)).allocate(&blocks, &[], 0).unwrap_err();
    assert!(matches!(err, AllocationError::WinnerResolution { matches: 0, .. }));
}

// =========================================================================
// 2. Invariants
// =========================================================================

#[test]
fn test_total_stake_mismatch_aborts_run() {
    let stakers = vec![common("B62a", 1_000), nps("B62b", 500)];
    let blocks = vec![
        make_block(10, Some(COINBASE), "B62a", 100),
        make_block(11, Some(COINBASE), "B62a", 101),
    ];

    let err = allocator(dec!(0.05))
        .allocate(&blocks, &stakers, 1_499)
        .unwrap_err();

    assert_eq!(
        err,
        AllocationError::PoolInvariance {
            height: 10,
            pool: Pool::Nps,
            expected: 1_499,
            actual: 1_500,
        }
    );
}

#[test]
fn test_winner_missing_from_ledger_aborts_run() {
    let stakers = vec![common("B62a", 1_000)];
    let blocks = vec![
        make_block(10, Some(COINBASE), "B62a", 100),
        make_block(11, Some(COINBASE), "B62stranger", 101),
    ];
    let err = allocator(dec!(0))
        .allocate(&blocks, &stakers, 1_000)
        .unwrap_err();
    assert_eq!(
        err,
        AllocationError::WinnerResolution {
            height: 11,
            winner: "B62stranger".to_string(),
            matches: 0,
        }
    );
}

// =========================================================================
// 3. NPS class
// =========================================================================

#[test]
fn test_nps_payout_ignores_operator_commission() {
    let stakers = vec![common("B62a", 3_000), nps("B62b", 1_000)];
    let blocks = vec![make_block(10, Some(COINBASE), "B62a", 100)];

    for rate in [dec!(0), dec!(0.05), dec!(0.2), dec!(1)] {
        let result = allocator(rate)
            .allocate(&blocks, &stakers, total_stake(&stakers))
            .unwrap();
        let detail = result
            .details
            .iter()
            .find(|d| d.public_key == "B62b")
            .unwrap();
        // unlocked winner: NPS pool = 360B, weighting 1/4 -> 0.95 * 90B
        assert_eq!(detail.effective_nps_pool_weighting, dec!(0.25));
        assert_eq!(detail.payout, 85_500_000_000, "rate {}", rate);
        assert_eq!(detail.effective_common_pool_stakes, 0);
        assert_eq!(detail.effective_supercharged_pool_stakes, 0);
    }
}

#[test]
fn test_full_commission_pays_common_nothing() {
    let stakers = vec![common("B62a", 3_000), nps("B62b", 1_000)];
    let blocks = vec![make_block(10, Some(COINBASE), "B62a", 100)];
    let result = allocator(dec!(1))
        .allocate(&blocks, &stakers, total_stake(&stakers))
        .unwrap();

    assert_eq!(result.totals.get("B62a"), 0);
    assert_eq!(result.transactions.len(), 1);
    assert_eq!(result.transactions[0].public_key, "B62b");
    assert_eq!(result.total_payout, 85_500_000_000);
}

// =========================================================================
// 4. Floor only removes value
// =========================================================================

#[test]
fn test_floored_terms_never_exceed_pool_rewards() {
    let stakers = vec![
        common("B62a", 333_333_333),
        common("B62b", 777_777_777),
        nps("B62c", 123_456_789),
        Staker::new("B62d", ShareClass::Common, 999_999_999, 5_000),
        nps("B62e", 1),
    ];
    let stake = total_stake(&stakers);
    let mut block = make_block(10, Some(1_440_000_000_001), "B62b", 1_000);
    block.fee_transfer_to_receiver = 123_456_789;
    block.fee_transfer_from_coinbase = 3_333;

    let result = allocator(dec!(0))
        .allocate(&[block.clone()], &stakers, stake)
        .unwrap();

    let split = PoolSplit::for_block(&block, 1_440_000_000_001, false);
    let paid: i64 = result.details.iter().map(|d| d.payout).sum();
    let income = Decimal::from_i128_with_scale(split.total_rewards, 0);
    assert!(Decimal::from(paid) <= income);

    // NPS stakers only draw on the NPS pool
    let nps_paid: i64 = result
        .details
        .iter()
        .filter(|d| d.share_class == ShareClass::Nps)
        .map(|d| d.payout)
        .sum();
    assert!(Decimal::from(nps_paid) <= split.nps.to_decimal());
}

#[test]
fn test_floor_dust_is_at_most_one_unit_per_term() {
    let stakers = vec![
        common("B62a", 333_333_333),
        common("B62b", 777_777_777),
        common("B62c", 1),
    ];
    let block = make_block(10, Some(1_440_000_000_001), "B62b", 1_000);
    let result = allocator(dec!(0))
        .allocate(&[block.clone()], &stakers, total_stake(&stakers))
        .unwrap();

    let split = PoolSplit::for_block(&block, 1_440_000_000_001, false);
    let paid: i64 = result.details.iter().map(|d| d.payout).sum();
    let dust = split.total_rewards - i128::from(paid);
    assert!(dust >= 0);
    assert!(dust <= 3 * stakers.len() as i128);
}

#[test]
fn test_negative_common_pool_reduces_payouts() {
    let stakers = vec![common("B62a", 1_000)];
    let mut block = make_block(10, Some(COINBASE), "B62a", 100);
    block.fee_transfer_to_receiver = 0;
    block.fee_transfer_from_coinbase = 5_000_001;

    let result = allocator(dec!(0)).allocate(&[block], &stakers, 1_000).unwrap();
    let detail = &result.details[0];
    assert_eq!(detail.total_rewards_common_pool, dec!(-5000001));
    assert_eq!(detail.payout, 720_000_000_000 - 5_000_001);
}

// =========================================================================
// 5. End-to-end
// =========================================================================

#[test]
fn test_locked_winner_two_equal_common_stakers() {
    let stakers = vec![
        Staker::new("B62a", ShareClass::Common, 500_000_000_000, 10_000),
        common("B62b", 500_000_000_000),
    ];
    let blocks = vec![make_block(995, Some(COINBASE), "B62a", 1_395)];

    let result = allocator(dec!(0))
        .allocate(&blocks, &stakers, total_stake(&stakers))
        .unwrap();

    let total_rewards: i64 = 720_010_000_000;
    assert_eq!(result.details.len(), 2);
    for detail in &result.details {
        assert_eq!(detail.total_rewards, total_rewards);
        assert_eq!(detail.total_rewards_nps_pool, dec!(720000000000));
        assert_eq!(detail.total_rewards_supercharged_pool, Decimal::ZERO);
        assert_eq!(detail.total_rewards_common_pool, dec!(10000000));
        assert_eq!(detail.effective_nps_pool_weighting, dec!(0.5));
        assert_eq!(detail.effective_common_pool_weighting, dec!(0.5));
        assert_eq!(detail.payout, total_rewards / 2);
    }
    assert_eq!(result.total_payout, 720_010_000_000);
    assert_eq!(result.transactions[0].amount, 360_005_000_000);
    assert_eq!(result.transactions[0].fee, 0);
    assert_eq!(result.transactions[1].amount, 360_005_000_000);
}

#[test]
fn test_totals_accumulate_across_blocks_in_order() {
    let stakers = vec![common("B62a", 1_000), common("B62b", 3_000)];
    let blocks = vec![
        make_block(12, Some(COINBASE), "B62a", 100),
        make_block(10, None, "B62a", 98),
        make_block(11, Some(COINBASE), "B62b", 99),
    ];

    let result = allocator(dec!(0.05))
        .allocate(&blocks, &stakers, 4_000)
        .unwrap();

    assert_eq!(result.processed_heights, vec![12, 10, 11]);
    let heights: Vec<u64> = result.details.iter().map(|d| d.block_height).collect();
    assert_eq!(heights, vec![12, 12, 11, 11]);

    let a_sum: i64 = result
        .details
        .iter()
        .filter(|d| d.public_key == "B62a")
        .map(|d| d.payout)
        .sum();
    assert_eq!(result.totals.get("B62a"), a_sum);
    assert_eq!(result.transactions[0].amount, a_sum as u64);
    assert_eq!(
        result.total_payout,
        result.transactions.iter().map(|t| t.amount).sum::<u64>()
    );
}

#[test]
fn test_allocate_from_carries_opening_totals() {
    let stakers = vec![common("B62a", 1_000)];
    let blocks = vec![make_block(10, None, "B62a", 100)];
    let opening: PayoutTotals = [("B62a".to_string(), 42)].into_iter().collect();

    let result = allocator(dec!(0))
        .allocate_from(opening, &blocks, &stakers, 1_000)
        .unwrap();

    assert_eq!(result.transactions.len(), 1);
    assert_eq!(result.transactions[0].amount, 42);
    assert_eq!(result.total_payout, 42);
}

#[test]
fn test_audit_record_serializes_with_ledger_field_names() {
    let stakers = vec![common("B62a", 1_000)];
    let blocks = vec![make_block(10, Some(COINBASE), "B62a", 100)];
    let result = allocator(dec!(0)).allocate(&blocks, &stakers, 1_000).unwrap();

    let json = serde_json::to_value(&result.details[0]).unwrap();
    assert_eq!(json["publicKey"], "B62a");
    assert_eq!(json["blockHeight"], 10);
    assert_eq!(json["shareClass"], "Common");
    assert_eq!(json["sumEffectiveNPSPoolStakes"], 1_000);
    assert!(json.get("effectiveNPSPoolWeighting").is_some());
    assert!(json.get("totalRewardsNPSPool").is_some());
}
