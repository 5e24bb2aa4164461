use payout_core::PayoutTransaction;

/// Assigns the network fee to each transaction of the final transfer list.
#[derive(Debug, Clone, Copy)]
pub struct TransactionBuilder {
    default_fee: u64,
}

impl TransactionBuilder {
    pub fn new(default_fee: u64) -> Self {
        Self { default_fee }
    }

    pub fn build(&self, transactions: Vec<PayoutTransaction>) -> Vec<PayoutTransaction> {
        transactions
            .into_iter()
            .map(|t| PayoutTransaction {
                fee: self.default_fee,
                ..t
            })
            .collect()
    }
}
