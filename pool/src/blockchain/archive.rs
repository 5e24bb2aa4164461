/// Archive API client - blocks, epochs and staking ledgers over JSON/HTTP

use anyhow::{Context, Result};
use payout_core::Block;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::{BlockDataProvider, HeightRange, StakeDataProvider, StakingLedger};

#[derive(Debug, Deserialize)]
struct LatestHeight {
    #[serde(rename = "blockheight")]
    height: u64,
}

pub struct ArchiveClient {
    base_url: String,
    client: reqwest::Client,
}

impl ArchiveClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout.unwrap_or(Duration::from_secs(30)))
            .build()
            .context("failed to build archive HTTP client")?;

        let base_url = base_url.trim_end_matches('/').to_string();
        tracing::info!("ArchiveClient initialized: {}", base_url);

        Ok(Self { base_url, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("archive request failed: {}", url))?
            .error_for_status()
            .with_context(|| format!("archive returned an error status: {}", url))?;

        response
            .json::<T>()
            .await
            .with_context(|| format!("archive response is not valid JSON: {}", url))
    }
}

impl BlockDataProvider for ArchiveClient {
    async fn latest_height(&self) -> Result<u64> {
        let latest: LatestHeight = self.get("blocks/latest-height", &[]).await?;
        Ok(latest.height)
    }

    async fn blocks(&self, key: &str, min_height: u64, max_height: u64) -> Result<Vec<Block>> {
        let blocks: Vec<Block> = self
            .get(
                "blocks",
                &[
                    ("key", key.to_string()),
                    ("minHeight", min_height.to_string()),
                    ("maxHeight", max_height.to_string()),
                ],
            )
            .await?;
        tracing::debug!(count = blocks.len(), min_height, max_height, "fetched blocks");
        Ok(blocks)
    }

    async fn epoch_heights(&self, epoch: u64, fork: u64) -> Result<HeightRange> {
        self.get(&format!("epochs/{}", epoch), &[("fork", fork.to_string())])
            .await
    }
}

impl StakeDataProvider for ArchiveClient {
    async fn stakes(&self, ledger_hash: &str, key: &str) -> Result<StakingLedger> {
        let ledger: StakingLedger = self
            .get(
                &format!("staking-ledgers/{}", ledger_hash),
                &[("key", key.to_string())],
            )
            .await?;
        tracing::debug!(
            ledger_hash,
            delegators = ledger.stakes.len(),
            total = ledger.total_staking_balance,
            "fetched staking ledger"
        );
        Ok(ledger)
    }
}
