//! Running payout totals threaded through the block fold.

use std::collections::{HashMap, HashSet};

use crate::error::{AllocationError, Result};
use crate::types::{PayoutTransaction, Staker};

/// Public key -> accumulated payout across all blocks seen so far.
///
/// Totals are signed: a negative common-pool reward can pull a staker below
/// zero for a block. Only strictly positive totals become transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayoutTotals {
    totals: HashMap<String, i64>,
}

impl PayoutTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, public_key: &str) -> i64 {
        self.totals.get(public_key).copied().unwrap_or(0)
    }

    pub fn add(&mut self, public_key: &str, amount: i64) -> Result<()> {
        let entry = self.totals.entry(public_key.to_string()).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| AllocationError::AmountOverflow {
                public_key: public_key.to_string(),
            })?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// One transaction per staker with a positive total, in staker order,
    /// plus the sum of their amounts.
    pub fn transactions(&self, stakers: &[Staker]) -> Result<(Vec<PayoutTransaction>, u64)> {
        let mut seen = HashSet::new();
        let mut transactions = Vec::new();
        let mut total_payout: u64 = 0;

        for staker in stakers {
            if !seen.insert(staker.public_key.as_str()) {
                continue;
            }
            let amount = self.get(&staker.public_key);
            if amount <= 0 {
                continue;
            }
            let amount = amount.unsigned_abs();
            total_payout = total_payout
                .checked_add(amount)
                .ok_or_else(|| AllocationError::AmountOverflow {
                    public_key: staker.public_key.clone(),
                })?;
            transactions.push(PayoutTransaction::new(staker.public_key.clone(), amount));
        }

        Ok((transactions, total_payout))
    }
}

impl FromIterator<(String, i64)> for PayoutTotals {
    fn from_iter<T: IntoIterator<Item = (String, i64)>>(iter: T) -> Self {
        Self {
            totals: iter.into_iter().collect(),
        }
    }
}
