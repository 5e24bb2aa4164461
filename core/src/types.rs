//! Input and output records shared by the allocator and the finalizer.
//!
//! All monetary values are integers in the smallest indivisible unit
//! (1 MINA = 1,000,000,000 nanomina).

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// A block produced by the pool, as returned by the archive API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "blockheight")]
    pub height: u64,
    /// Milliseconds since the Unix epoch
    #[serde(rename = "blockdatetime")]
    pub date_time: i64,
    #[serde(rename = "globalslotsincegenesis")]
    pub global_slot: u64,
    /// `None` when the archive has no coinbase on record for this block
    #[serde(default)]
    pub coinbase: Option<u64>,
    #[serde(rename = "feetransfertoreceiver", default)]
    pub fee_transfer_to_receiver: u64,
    #[serde(rename = "feetransferfromcoinbase", default)]
    pub fee_transfer_from_coinbase: u64,
    #[serde(rename = "usercommandtransactionfees", default)]
    pub user_command_transaction_fees: u64,
    #[serde(rename = "creatorpublickey")]
    pub creator_public_key: String,
    #[serde(rename = "winnerpublickey")]
    pub winner_public_key: String,
    #[serde(rename = "statehash")]
    pub state_hash: String,
    #[serde(rename = "stakingledgerhash")]
    pub staking_ledger_hash: String,
}

impl Block {
    /// Coinbase if this block carries a reward, `None` for zero or absent.
    pub fn reward_coinbase(&self) -> Option<u64> {
        self.coinbase.filter(|c| *c > 0)
    }
}

// ---------------------------------------------------------------------------
// Stakers
// ---------------------------------------------------------------------------

/// Share class of a delegation.
///
/// Labels that are neither `Common` nor `NPS` are kept as `Other` so that the
/// allocator can reject them explicitly instead of failing at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShareClass {
    Common,
    Nps,
    Other(String),
}

impl ShareClass {
    pub fn as_str(&self) -> &str {
        match self {
            ShareClass::Common => "Common",
            ShareClass::Nps => "NPS",
            ShareClass::Other(label) => label,
        }
    }
}

impl From<String> for ShareClass {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Common" => ShareClass::Common,
            "NPS" => ShareClass::Nps,
            _ => ShareClass::Other(label),
        }
    }
}

impl From<ShareClass> for String {
    fn from(class: ShareClass) -> Self {
        class.as_str().to_string()
    }
}

impl fmt::Display for ShareClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One delegation in the staking ledger for the epoch being paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staker {
    pub public_key: String,
    pub share_class: ShareClass,
    pub staking_balance: u64,
    /// Global slot after which the account's time-lock has expired
    #[serde(default)]
    pub untimed_after_slot: u64,
}

impl Staker {
    pub fn new(
        public_key: impl Into<String>,
        share_class: ShareClass,
        staking_balance: u64,
        untimed_after_slot: u64,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            share_class,
            staking_balance,
            untimed_after_slot,
        }
    }
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// A value transfer to one staker. `fee` stays 0 until a transaction
/// builder downstream assigns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutTransaction {
    pub public_key: String,
    pub amount: u64,
    pub fee: u64,
}

impl PayoutTransaction {
    pub fn new(public_key: impl Into<String>, amount: u64) -> Self {
        Self {
            public_key: public_key.into(),
            amount,
            fee: 0,
        }
    }
}
