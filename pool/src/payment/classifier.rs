/// Turns staking-ledger entries into classified stakers.

use payout_core::{ShareClass, Staker};
use std::collections::HashSet;

use crate::blockchain::LedgerEntry;

/// Ledger entries carrying an explicit share class keep it; otherwise keys
/// listed as NPS are `NPS` and everything else is `Common`.
#[derive(Debug, Clone, Default)]
pub struct ShareClassifier {
    nps_keys: HashSet<String>,
}

impl ShareClassifier {
    pub fn new<I, S>(nps_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nps_keys: nps_keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classify(&self, entry: &LedgerEntry) -> Staker {
        let share_class = match &entry.share_class {
            Some(label) => ShareClass::from(label.clone()),
            None if self.nps_keys.contains(&entry.public_key) => ShareClass::Nps,
            None => ShareClass::Common,
        };
        Staker::new(
            entry.public_key.clone(),
            share_class,
            entry.staking_balance,
            entry.untimed_after_slot,
        )
    }

    pub fn classify_all(&self, entries: &[LedgerEntry]) -> Vec<Staker> {
        entries.iter().map(|e| self.classify(e)).collect()
    }
}
