use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use zeroize::Zeroize;

const DEFAULT_CONFIG_FILE: &str = "payout_config.json";

/// One nanomina-denominated MINA.
pub const NANOMINA: u64 = 1_000_000_000;

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Config {
    pub archive_url: String,
    pub archive_key: String,
    pub graphql_url: String,
    /// Block producer key whose blocks are paid out
    pub pool_public_key: String,
    pub sender_public_key: String,
    /// Hex-encoded 32-byte signing key of the sending account
    pub sender_secret_key: SecretString,
    pub commission_rate: Decimal,
    pub min_height: u64,
    pub max_height: u64,
    pub min_confirmations: u64,
    pub payout_threshold: u64,
    pub default_fee: u64,
    pub memo: String,
    pub data_dir: PathBuf,
    pub substitution_file: PathBuf,
    pub nps_public_keys: Vec<String>,
    pub send_interval_ms: u64,
    pub payout_hash: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive_url: "http://127.0.0.1:8080".to_string(),
            archive_key: String::new(),
            graphql_url: "http://127.0.0.1:3085/graphql".to_string(),
            pool_public_key: String::new(),
            sender_public_key: String::new(),
            sender_secret_key: SecretString::default(),
            commission_rate: dec!(0.05),
            min_height: 0,
            max_height: u64::MAX,
            min_confirmations: 15,
            payout_threshold: 0,
            default_fee: NANOMINA / 10,
            memo: String::new(),
            data_dir: PathBuf::from("data"),
            substitution_file: PathBuf::from("data/substitutePayTo.csv"),
            nps_public_keys: Vec::new(),
            send_interval_ms: 5_000,
            payout_hash: None,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Defaults, then environment, then `PAYOUT_CONFIG` or `payout_config.json`
    /// if present. A config file replaces the environment values wholesale
    /// except for the secret key, which is only taken from the file when set
    /// there.
    pub fn load() -> Self {
        let path = std::env::var("PAYOUT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();

        if let Ok(txt) = std::fs::read_to_string(path) {
            match serde_json::from_str::<Config>(&txt) {
                Ok(mut file_cfg) => {
                    if file_cfg.sender_secret_key.is_empty() {
                        std::mem::swap(&mut file_cfg.sender_secret_key, &mut cfg.sender_secret_key);
                    }
                    cfg = file_cfg;
                    tracing::info!("Loaded payout config from {}", path.display());
                }
                Err(e) => {
                    tracing::warn!("Failed to parse payout config {}: {}", path.display(), e);
                }
            }
        }

        cfg.normalize();
        cfg
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("PAYOUT_ARCHIVE_URL") { self.archive_url = v; }
        if let Ok(v) = std::env::var("PAYOUT_ARCHIVE_KEY") { self.archive_key = v; }
        if let Ok(v) = std::env::var("PAYOUT_GRAPHQL_URL") {
            self.graphql_url = v;
        } else if let Ok(v) = std::env::var("MINA_GRAPHQL_URL") {
            // legacy
            self.graphql_url = v;
        }
        if let Ok(v) = std::env::var("POOL_PUBLIC_KEY") { self.pool_public_key = v; }
        if let Ok(v) = std::env::var("SEND_PUBLIC_KEY") { self.sender_public_key = v; }
        if let Ok(v) = std::env::var("SEND_PRIVATE_KEY") { self.sender_secret_key = v.into(); }
        if let Ok(v) = std::env::var("COMMISSION_RATE") {
            match v.parse() {
                Ok(rate) => self.commission_rate = rate,
                Err(e) => tracing::warn!("Ignoring COMMISSION_RATE={}: {}", v, e),
            }
        }
        if let Ok(v) = std::env::var("MIN_HEIGHT") { self.min_height = v.parse().unwrap_or(0); }
        if let Ok(v) = std::env::var("MAX_HEIGHT") { self.max_height = v.parse().unwrap_or(u64::MAX); }
        if let Ok(v) = std::env::var("MIN_CONFIRMATIONS") { self.min_confirmations = v.parse().unwrap_or(15); }
        if let Ok(v) = std::env::var("PAYOUT_THRESHOLD") { self.payout_threshold = v.parse().unwrap_or(0); }
        if let Ok(v) = std::env::var("DEFAULT_FEE") { self.default_fee = v.parse().unwrap_or(0); }
        if let Ok(v) = std::env::var("PAYOUT_MEMO") { self.memo = v; }
        if let Ok(v) = std::env::var("PAYOUT_DATA_DIR") { self.data_dir = PathBuf::from(v); }
        if let Ok(v) = std::env::var("SUBSTITUTE_PAY_TO_FILE") { self.substitution_file = PathBuf::from(v); }
        if let Ok(v) = std::env::var("NPS_PUBLIC_KEYS") {
            self.nps_public_keys = v
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect();
        }
        if let Ok(v) = std::env::var("SEND_INTERVAL_MS") { self.send_interval_ms = v.parse().unwrap_or(5_000); }
        if let Ok(v) = std::env::var("PAYOUT_HASH") {
            if !v.is_empty() {
                self.payout_hash = Some(v);
            }
        }
    }

    fn normalize(&mut self) {
        if self.max_height == 0 {
            self.max_height = u64::MAX;
        }
        if self.default_fee == 0 {
            self.default_fee = NANOMINA / 10;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = 30;
        }
        if self.payout_hash.as_deref() == Some("") {
            self.payout_hash = None;
        }
        self.commission_rate = self.commission_rate.normalize();
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.commission_rate < Decimal::ZERO || self.commission_rate > Decimal::ONE {
            anyhow::bail!("commission_rate {} must be within [0, 1]", self.commission_rate);
        }
        if self.min_height > self.max_height {
            anyhow::bail!(
                "min_height {} is above max_height {}",
                self.min_height,
                self.max_height
            );
        }
        if self.pool_public_key.is_empty() {
            anyhow::bail!("pool_public_key is not set (POOL_PUBLIC_KEY)");
        }
        Ok(())
    }
}

/// A secret that is wiped from memory when dropped and never printed.
#[derive(Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}
