/// Transaction writer - persists the transfer list and the audit details of a
/// run under the data directory, and computes the payout hash that gates
/// sending.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use payout_core::{PayoutDetail, PayoutTransaction};
use sha3::{Digest, Sha3_256};
use std::path::{Path, PathBuf};

use crate::config::NANOMINA;

/// SHA3-256 (hex) over the JSON encoding of the audit details.
pub fn payout_hash(details: &[PayoutDetail]) -> Result<String> {
    let encoded = serde_json::to_vec(details).context("failed to encode payout details")?;
    Ok(hex::encode(Sha3_256::digest(&encoded)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub transactions: PathBuf,
    pub details: PathBuf,
}

pub struct TransactionWriter {
    data_dir: PathBuf,
}

impl TransactionWriter {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn write(
        &self,
        transactions: &[PayoutTransaction],
        details: &[PayoutDetail],
        min_height: u64,
        max_height: u64,
        run_time: DateTime<Utc>,
    ) -> Result<WrittenFiles> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;

        let transactions_path =
            self.output_path("payout_transactions", run_time, min_height, max_height);
        write_json(&transactions_path, transactions)?;

        let details_path = self.output_path("payout_details", run_time, min_height, max_height);
        write_json(&details_path, details)?;

        tracing::info!(
            "Wrote {} transactions to {} and {} details to {}",
            transactions.len(),
            transactions_path.display(),
            details.len(),
            details_path.display()
        );

        Ok(WrittenFiles {
            transactions: transactions_path,
            details: details_path,
        })
    }

    pub fn log_funding(&self, sender_public_key: &str, funds_needed: u64) {
        tracing::info!(
            "Fund {} with {}.{:09} MINA before sending",
            sender_public_key,
            funds_needed / NANOMINA,
            funds_needed % NANOMINA
        );
    }

    fn output_path(
        &self,
        identifier: &str,
        run_time: DateTime<Utc>,
        min_height: u64,
        max_height: u64,
    ) -> PathBuf {
        self.data_dir.join(format!(
            "{}_{}_{}_{}.json",
            identifier,
            run_time.format("%Y%m%d%H%M%S%3f"),
            min_height,
            max_height
        ))
    }
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec(value)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
