//! Transfer-list finalizer.
//!
//! Applied once to the aggregated transactions of a run:
//! 1. An empty table leaves the list untouched
//! 2. Otherwise every transaction at or below the payout threshold is dropped
//! 3. Rules are applied in table order: `EXCLUDE` drops the key, any other
//!    target rewrites it. A key rewritten by one rule is seen by later rules.

use serde::{Deserialize, Serialize};

use crate::types::PayoutTransaction;

/// Target value in a substitution table that removes the source key.
pub const EXCLUDE_MARKER: &str = "EXCLUDE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayTo {
    Exclude,
    Address(String),
}

impl PayTo {
    pub fn parse(target: &str) -> Self {
        if target == EXCLUDE_MARKER {
            PayTo::Exclude
        } else {
            PayTo::Address(target.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionRule {
    pub from: String,
    pub to: PayTo,
}

impl SubstitutionRule {
    pub fn new(from: impl Into<String>, to: PayTo) -> Self {
        Self {
            from: from.into(),
            to,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionTable {
    rules: Vec<SubstitutionRule>,
}

impl SubstitutionTable {
    pub fn new(rules: Vec<SubstitutionRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[SubstitutionRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

impl FromIterator<SubstitutionRule> for SubstitutionTable {
    fn from_iter<T: IntoIterator<Item = SubstitutionRule>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

pub fn finalize(
    transactions: Vec<PayoutTransaction>,
    table: &SubstitutionTable,
    payout_threshold: u64,
) -> Vec<PayoutTransaction> {
    if table.is_empty() {
        return transactions;
    }

    let before = transactions.len();
    let mut transactions: Vec<PayoutTransaction> = transactions
        .into_iter()
        .filter(|t| t.amount > payout_threshold)
        .collect();
    let below_threshold = before - transactions.len();

    for rule in table.rules() {
        match &rule.to {
            PayTo::Exclude => transactions.retain(|t| t.public_key != rule.from),
            PayTo::Address(to) => {
                for t in transactions.iter_mut().filter(|t| t.public_key == rule.from) {
                    tracing::debug!(from = %rule.from, to = %to, amount = t.amount, "substituting pay-to address");
                    t.public_key = to.clone();
                }
            }
        }
    }

    tracing::info!(
        rules = table.len(),
        below_threshold,
        excluded = before - below_threshold - transactions.len(),
        remaining = transactions.len(),
        "transfer list finalized"
    );

    transactions
}
