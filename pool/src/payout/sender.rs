/// Transaction sender
///
/// Sending is gated by the payout hash of the run:
/// - no expected hash: log the computed hash and stop (review mode)
/// - mismatching hash: error, nothing is sent
/// - matching hash: sign and submit each transaction with consecutive
///   nonces, then record the paid blocks
///
/// A failed submission stops the batch so the nonce sequence has no gaps.

use anyhow::{bail, Context, Result};
use payout_core::{Block, PayoutDetail, PayoutTransaction};
use std::path::PathBuf;
use std::time::Duration;

use super::ledger::PaidBlockLedger;
use super::wallet::{PaymentPayload, PoolWallet};
use super::writer::payout_hash;
use crate::blockchain::PaymentNode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// No payout hash was supplied; nothing was sent
    Review { payout_hash: String },
    Sent { payout_hash: String, count: usize, next_nonce: u64 },
}

pub struct TransactionSender<N> {
    node: N,
    wallet: PoolWallet,
    memo: String,
    data_dir: PathBuf,
    send_interval: Duration,
}

impl<N: PaymentNode> TransactionSender<N> {
    pub fn new(
        node: N,
        wallet: PoolWallet,
        memo: String,
        data_dir: PathBuf,
        send_interval: Duration,
    ) -> Self {
        Self {
            node,
            wallet,
            memo,
            data_dir,
            send_interval,
        }
    }

    pub fn sender_public_key(&self) -> &str {
        &self.wallet.public_key_hex
    }

    pub async fn send(
        &self,
        transactions: &[PayoutTransaction],
        details: &[PayoutDetail],
        blocks: &[Block],
        expected_hash: Option<&str>,
    ) -> Result<SendOutcome> {
        let calculated = payout_hash(details)?;

        let Some(expected) = expected_hash else {
            tracing::info!("PAYOUT HASH: {}", calculated);
            return Ok(SendOutcome::Review {
                payout_hash: calculated,
            });
        };

        if expected != calculated {
            bail!(
                "payout hash mismatch: expected {}, calculated {}",
                expected,
                calculated
            );
        }
        tracing::info!("Processing signed payout for hash {}", calculated);

        let from = self.wallet.public_key_hex.clone();
        let mut nonce = self
            .node
            .inferred_nonce(&from)
            .await
            .context("failed to fetch sender nonce")?;

        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;

        for (i, transaction) in transactions.iter().enumerate() {
            if i > 0 && !self.send_interval.is_zero() {
                tokio::time::sleep(self.send_interval).await;
            }
            tracing::info!(
                "Sending nonce {}: {} to {} (fee {})",
                nonce,
                transaction.amount,
                transaction.public_key,
                transaction.fee
            );

            let payment = self.wallet.sign(PaymentPayload {
                from: from.clone(),
                to: transaction.public_key.clone(),
                amount: transaction.amount,
                fee: transaction.fee,
                nonce,
                memo: self.memo.clone(),
            })?;

            let response = self.node.send_payment(&payment).await.with_context(|| {
                format!(
                    "sendPayment failed at nonce {} after {} of {} transactions",
                    nonce,
                    i,
                    transactions.len()
                )
            })?;

            let receipt = self.data_dir.join(format!("{}.json", nonce));
            std::fs::write(&receipt, serde_json::to_vec(&response)?)
                .with_context(|| format!("failed to write {}", receipt.display()))?;

            nonce += 1;
        }

        PaidBlockLedger::new(&self.data_dir).append(blocks)?;

        tracing::info!(
            "Sent {} payouts, next nonce {}",
            transactions.len(),
            nonce
        );

        Ok(SendOutcome::Sent {
            payout_hash: calculated,
            count: transactions.len(),
            next_nonce: nonce,
        })
    }
}
