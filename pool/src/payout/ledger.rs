/// Paid-block ledger: an append-only `height|state_hash` file recording the
/// blocks whose rewards have been sent.

use anyhow::{Context, Result};
use payout_core::Block;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const PAID_BLOCKS_FILE: &str = ".paidblocks";

pub struct PaidBlockLedger {
    path: PathBuf,
}

impl PaidBlockLedger {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(PAID_BLOCKS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, blocks: &[Block]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;

        for block in blocks {
            writeln!(file, "{}|{}", block.height, block.state_hash)?;
        }
        file.flush()?;

        tracing::info!("Recorded {} paid blocks in {}", blocks.len(), self.path.display());
        Ok(())
    }

    /// `(height, state_hash)` pairs already paid. A missing ledger is empty.
    pub fn paid(&self) -> Result<HashSet<(u64, String)>> {
        if !self.path.exists() {
            return Ok(HashSet::new());
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;

        let mut paid = HashSet::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let Some((height, state_hash)) = line.split_once('|') else {
                tracing::warn!("Skipping malformed paid-block line {:?}", line);
                continue;
            };
            match height.trim().parse::<u64>() {
                Ok(h) => {
                    paid.insert((h, state_hash.trim().to_string()));
                }
                Err(_) => tracing::warn!("Skipping malformed paid-block line {:?}", line),
            }
        }
        Ok(paid)
    }

    /// Blocks among `blocks` that the ledger already records as paid.
    pub fn already_paid<'a>(&self, blocks: &'a [Block]) -> Result<Vec<&'a Block>> {
        let paid = self.paid()?;
        Ok(blocks
            .iter()
            .filter(|b| paid.contains(&(b.height, b.state_hash.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(height: u64, hash: &str) -> Block {
        Block {
            height,
            date_time: 0,
            global_slot: height,
            coinbase: Some(1),
            fee_transfer_to_receiver: 0,
            fee_transfer_from_coinbase: 0,
            user_command_transaction_fees: 0,
            creator_public_key: "c".into(),
            winner_public_key: "w".into(),
            state_hash: hash.into(),
            staking_ledger_hash: "l".into(),
        }
    }

    #[test]
    fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = PaidBlockLedger::new(dir.path());
        assert!(ledger.paid().unwrap().is_empty());

        ledger.append(&[block(1, "3NLa"), block(2, "3NLb")]).unwrap();
        ledger.append(&[block(3, "3NLc")]).unwrap();

        let text = std::fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(text, "1|3NLa\n2|3NLb\n3|3NLc\n");

        let candidates = [block(2, "3NLb"), block(2, "3NLfork"), block(4, "3NLd")];
        let paid = ledger.already_paid(&candidates).unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].state_hash, "3NLb");
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = PaidBlockLedger::new(dir.path());
        std::fs::write(ledger.path(), "junk\nx|3NL\n5|3NLe\n").unwrap();
        let paid = ledger.paid().unwrap();
        assert_eq!(paid.len(), 1);
        assert!(paid.contains(&(5, "3NLe".to_string())));
    }
}
