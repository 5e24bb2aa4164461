/// Run summary: what the pool took in and what it pays out.

use payout_core::{Block, PayoutTransaction};
use serde::Serialize;

use crate::config::NANOMINA;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PaymentSummary {
    pub blocks: usize,
    pub coinbase_sum: u64,
    pub fee_transfer_from_coinbase_sum: u64,
    pub user_command_transaction_fee_sum: u64,
    pub net_coinbase_received: i128,
    pub payout_amounts_sum: u64,
    pub payout_fees_sum: u64,
    pub net_to_pool_operator: i128,
}

impl PaymentSummary {
    /// Amount the sending account must hold to cover the transfer list.
    pub fn funds_needed(&self) -> u64 {
        self.payout_amounts_sum.saturating_add(self.payout_fees_sum)
    }
}

pub struct PaymentSummarizer;

impl PaymentSummarizer {
    pub fn summarize(blocks: &[Block], transactions: &[PayoutTransaction]) -> PaymentSummary {
        let coinbase_sum = blocks.iter().map(|b| b.coinbase.unwrap_or(0)).sum::<u64>();
        let fee_transfer_from_coinbase_sum =
            blocks.iter().map(|b| b.fee_transfer_from_coinbase).sum::<u64>();
        let user_command_transaction_fee_sum =
            blocks.iter().map(|b| b.user_command_transaction_fees).sum::<u64>();
        let payout_amounts_sum = transactions.iter().map(|t| t.amount).sum::<u64>();
        let payout_fees_sum = transactions.iter().map(|t| t.fee).sum::<u64>();

        let net_coinbase_received =
            i128::from(coinbase_sum) - i128::from(fee_transfer_from_coinbase_sum);
        let net_to_pool_operator = net_coinbase_received
            + i128::from(user_command_transaction_fee_sum)
            - i128::from(payout_amounts_sum)
            - i128::from(payout_fees_sum);

        PaymentSummary {
            blocks: blocks.len(),
            coinbase_sum,
            fee_transfer_from_coinbase_sum,
            user_command_transaction_fee_sum,
            net_coinbase_received,
            payout_amounts_sum,
            payout_fees_sum,
            net_to_pool_operator,
        }
    }

    pub fn log(summary: &PaymentSummary) {
        tracing::info!(
            "Payout summary: {} blocks, coinbase {} MINA, fee transfers from coinbase {} MINA, user command fees {} MINA",
            summary.blocks,
            to_mina(summary.coinbase_sum.into()),
            to_mina(summary.fee_transfer_from_coinbase_sum.into()),
            to_mina(summary.user_command_transaction_fee_sum.into()),
        );
        tracing::info!(
            "Payouts {} MINA + fees {} MINA, net to pool operator {} MINA",
            to_mina(summary.payout_amounts_sum.into()),
            to_mina(summary.payout_fees_sum.into()),
            to_mina(summary.net_to_pool_operator),
        );
    }
}

fn to_mina(nanomina: i128) -> rust_decimal::Decimal {
    rust_decimal::Decimal::from_i128_with_scale(nanomina, 0)
        / rust_decimal::Decimal::from(NANOMINA)
}
