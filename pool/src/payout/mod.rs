pub mod ledger;
pub mod sender;
pub mod wallet;
pub mod writer;

pub use ledger::PaidBlockLedger;
pub use sender::{SendOutcome, TransactionSender};
pub use wallet::{PaymentPayload, PoolWallet, SignedPayment};
pub use writer::{payout_hash, TransactionWriter, WrittenFiles};
