/// Payment process: block range resolution, per-ledger allocation, transfer
/// list finalization, fees and summary.

pub mod block_processor;
pub mod builder;
pub mod classifier;
pub mod processor;
pub mod substitutions;
pub mod summarizer;
pub mod transaction_builder;

pub use block_processor::BlockProcessor;
pub use builder::PaymentBuilder;
pub use classifier::ShareClassifier;
pub use processor::{PaymentProcessor, RunOptions, RunOutcome};
pub use summarizer::{PaymentSummarizer, PaymentSummary};
pub use transaction_builder::TransactionBuilder;

use payout_core::{Block, PayoutDetail, PayoutTransaction};

/// Everything one payout run produced, from fetched blocks to the final
/// transfer list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentProcess {
    pub blocks: Vec<Block>,
    pub max_height: u64,
    /// Aggregated payouts before threshold, exclusions and substitutions
    pub payouts: Vec<PayoutTransaction>,
    /// Transfer list that will be written and sent, fees assigned
    pub final_payouts: Vec<PayoutTransaction>,
    pub details: Vec<PayoutDetail>,
    pub processed_heights: Vec<u64>,
    pub total_payout: u64,
    pub total_payout_funds_needed: u64,
}
