pub mod blockchain;
pub mod config;
pub mod payment;
pub mod payout;
