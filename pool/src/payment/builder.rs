/// Payment builder
///
/// ## Flow
/// 1. Cap the requested max height by the confirmation depth
/// 2. Fetch the pool's blocks in `[min, max]`
/// 3. Group blocks by staking-ledger hash (first-seen order)
/// 4. Fetch each ledger, classify stakers and run the allocator per group
/// 5. Merge transactions by public key and concatenate the audit details

use anyhow::{anyhow, Context, Result};
use payout_core::{Block, LockPolicy, PayoutTransaction, RewardAllocator, UntimedAfterSlot};
use std::collections::HashMap;

use super::{BlockProcessor, PaymentProcess, ShareClassifier};
use crate::blockchain::{BlockDataProvider, StakeDataProvider};

pub struct PaymentBuilder<B, S, L = UntimedAfterSlot> {
    block_provider: B,
    stake_provider: S,
    allocator: RewardAllocator<L>,
    classifier: ShareClassifier,
    pool_public_key: String,
    min_confirmations: u64,
}

impl<B, S, L> PaymentBuilder<B, S, L>
where
    B: BlockDataProvider,
    S: StakeDataProvider,
    L: LockPolicy,
{
    pub fn new(
        block_provider: B,
        stake_provider: S,
        allocator: RewardAllocator<L>,
        classifier: ShareClassifier,
        pool_public_key: String,
        min_confirmations: u64,
    ) -> Self {
        Self {
            block_provider,
            stake_provider,
            allocator,
            classifier,
            pool_public_key,
            min_confirmations,
        }
    }

    pub async fn build(&self, min_height: u64, max_height: u64) -> Result<PaymentProcess> {
        let latest = self
            .block_provider
            .latest_height()
            .await
            .context("failed to fetch latest block height")?;
        let max_height =
            BlockProcessor::last_height_to_process(max_height, self.min_confirmations, latest);

        tracing::info!(
            "Building payment for {} blocks {}..={} (latest {})",
            self.pool_public_key,
            min_height,
            max_height,
            latest
        );

        let blocks = self
            .block_provider
            .blocks(&self.pool_public_key, min_height, max_height)
            .await
            .context("failed to fetch blocks")?;

        let mut process = PaymentProcess {
            max_height,
            ..PaymentProcess::default()
        };
        let mut merged = TransactionMerger::default();

        for (ledger_hash, group) in group_by_ledger(&blocks) {
            let ledger = self
                .stake_provider
                .stakes(ledger_hash, &self.pool_public_key)
                .await
                .with_context(|| format!("failed to fetch staking ledger {}", ledger_hash))?;
            let stakers = self.classifier.classify_all(&ledger.stakes);

            tracing::info!(
                "Ledger {}: {} blocks, {} delegators, total stake {}",
                ledger_hash,
                group.len(),
                stakers.len(),
                ledger.total_staking_balance
            );

            let allocation = self
                .allocator
                .allocate(&group, &stakers, ledger.total_staking_balance)
                .with_context(|| format!("allocation failed for ledger {}", ledger_hash))?;

            for transaction in allocation.transactions {
                merged.add(transaction)?;
            }
            process.details.extend(allocation.details);
            process.processed_heights.extend(allocation.processed_heights);
        }

        process.payouts = merged.into_transactions();
        process.total_payout = process
            .payouts
            .iter()
            .try_fold(0u64, |acc, t| acc.checked_add(t.amount))
            .ok_or_else(|| anyhow!("total payout overflows 64 bits"))?;
        process.blocks = blocks;
        Ok(process)
    }
}

/// Blocks grouped by staking-ledger hash, groups in first-seen order and
/// blocks in input order within a group.
pub fn group_by_ledger(blocks: &[Block]) -> Vec<(&str, Vec<Block>)> {
    let mut groups: Vec<(&str, Vec<Block>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for block in blocks {
        let hash = block.staking_ledger_hash.as_str();
        let slot = *index.entry(hash).or_insert_with(|| {
            groups.push((hash, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(block.clone());
    }
    groups
}

/// Sums amounts per public key, keeping first-seen order.
#[derive(Debug, Default)]
struct TransactionMerger {
    transactions: Vec<PayoutTransaction>,
    index: HashMap<String, usize>,
}

impl TransactionMerger {
    fn add(&mut self, transaction: PayoutTransaction) -> Result<()> {
        match self.index.get(&transaction.public_key) {
            Some(&i) => {
                let existing = &mut self.transactions[i];
                existing.amount = existing
                    .amount
                    .checked_add(transaction.amount)
                    .ok_or_else(|| anyhow!("payout overflow for {}", transaction.public_key))?;
            }
            None => {
                self.index
                    .insert(transaction.public_key.clone(), self.transactions.len());
                self.transactions.push(transaction);
            }
        }
        Ok(())
    }

    fn into_transactions(self) -> Vec<PayoutTransaction> {
        self.transactions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(height: u64, ledger: &str) -> Block {
        Block {
            height,
            date_time: 0,
            global_slot: height,
            coinbase: None,
            fee_transfer_to_receiver: 0,
            fee_transfer_from_coinbase: 0,
            user_command_transaction_fees: 0,
            creator_public_key: "c".into(),
            winner_public_key: "w".into(),
            state_hash: format!("s{}", height),
            staking_ledger_hash: ledger.into(),
        }
    }

    #[test]
    fn test_group_by_ledger_first_seen_order() {
        let blocks = vec![block(3, "B"), block(1, "A"), block(2, "B"), block(4, "A")];
        let groups = group_by_ledger(&blocks);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "B");
        assert_eq!(
            groups[0].1.iter().map(|b| b.height).collect::<Vec<_>>(),
            vec![3, 2]
        );
        assert_eq!(groups[1].0, "A");
    }

    #[test]
    fn test_merger_sums_by_key() {
        let mut merger = TransactionMerger::default();
        merger.add(PayoutTransaction::new("a", 1)).unwrap();
        merger.add(PayoutTransaction::new("b", 2)).unwrap();
        merger.add(PayoutTransaction::new("a", 3)).unwrap();
        let out = merger.into_transactions();
        assert_eq!(
            out,
            vec![PayoutTransaction::new("a", 4), PayoutTransaction::new("b", 2)]
        );
    }

    #[test]
    fn test_merger_overflow() {
        let mut merger = TransactionMerger::default();
        merger.add(PayoutTransaction::new("a", u64::MAX)).unwrap();
        assert!(merger.add(PayoutTransaction::new("a", 1)).is_err());
    }
}
