/// Payment processor - one payout run end to end
///
/// build -> finalize -> assign fees -> summarize -> write files -> send

use anyhow::{bail, Result};
use chrono::Utc;
use payout_core::{finalize, LockPolicy, SubstitutionTable, UntimedAfterSlot};

use super::{PaymentBuilder, PaymentProcess, PaymentSummarizer, PaymentSummary, TransactionBuilder};
use crate::blockchain::{BlockDataProvider, PaymentNode, StakeDataProvider};
use crate::payout::{
    payout_hash, PaidBlockLedger, SendOutcome, TransactionSender, TransactionWriter, WrittenFiles,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub min_height: u64,
    pub max_height: u64,
    pub payout_hash: Option<String>,
    /// Stop after the output files are written
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub process: PaymentProcess,
    pub summary: PaymentSummary,
    pub files: WrittenFiles,
    pub payout_hash: String,
    /// `None` for dry runs
    pub send: Option<SendOutcome>,
}

pub struct PaymentProcessor<B, S, N, L = UntimedAfterSlot> {
    builder: PaymentBuilder<B, S, L>,
    substitutions: SubstitutionTable,
    payout_threshold: u64,
    transaction_builder: TransactionBuilder,
    writer: TransactionWriter,
    sender: Option<TransactionSender<N>>,
    sender_public_key: String,
}

impl<B, S, N, L> PaymentProcessor<B, S, N, L>
where
    B: BlockDataProvider,
    S: StakeDataProvider,
    N: PaymentNode,
    L: LockPolicy,
{
    pub fn new(
        builder: PaymentBuilder<B, S, L>,
        substitutions: SubstitutionTable,
        payout_threshold: u64,
        transaction_builder: TransactionBuilder,
        writer: TransactionWriter,
        sender: Option<TransactionSender<N>>,
        sender_public_key: String,
    ) -> Self {
        Self {
            builder,
            substitutions,
            payout_threshold,
            transaction_builder,
            writer,
            sender,
            sender_public_key,
        }
    }

    pub async fn run(&self, options: &RunOptions) -> Result<RunOutcome> {
        let mut process = self
            .builder
            .build(options.min_height, options.max_height)
            .await?;

        let already_paid =
            PaidBlockLedger::new(self.writer.data_dir()).already_paid(&process.blocks)?;
        if !already_paid.is_empty() {
            tracing::warn!(
                "{} blocks in range are already recorded as paid (first: {})",
                already_paid.len(),
                already_paid[0].height
            );
        }

        let finalized = finalize(
            process.payouts.clone(),
            &self.substitutions,
            self.payout_threshold,
        );
        process.final_payouts = self.transaction_builder.build(finalized);

        let summary = PaymentSummarizer::summarize(&process.blocks, &process.final_payouts);
        PaymentSummarizer::log(&summary);
        process.total_payout_funds_needed = summary.funds_needed();

        let files = self.writer.write(
            &process.final_payouts,
            &process.details,
            options.min_height,
            process.max_height,
            Utc::now(),
        )?;
        self.writer
            .log_funding(&self.sender_public_key, process.total_payout_funds_needed);

        let hash = payout_hash(&process.details)?;

        let send = if options.dry_run {
            tracing::info!("Dry run, not sending. PAYOUT HASH: {}", hash);
            None
        } else {
            match (&self.sender, options.payout_hash.as_deref()) {
                (Some(sender), expected) => Some(
                    sender
                        .send(&process.final_payouts, &process.details, &process.blocks, expected)
                        .await?,
                ),
                (None, Some(_)) => bail!("a payout hash was given but no sender key is configured"),
                (None, None) => {
                    tracing::info!("PAYOUT HASH: {}", hash);
                    Some(SendOutcome::Review {
                        payout_hash: hash.clone(),
                    })
                }
            }
        };

        Ok(RunOutcome {
            process,
            summary,
            files,
            payout_hash: hash,
            send,
        })
    }
}
