/// Pool Wallet - local signing of payout transactions
///
/// The sending account's Ed25519 key stays in-process. Each payment payload
/// is hashed with SHA3-256 and the digest is signed; only the payload and the
/// signature leave the process.

use anyhow::{anyhow, Context, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use zeroize::Zeroize;

/// Unsigned payment as submitted to the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub from: String,
    pub to: String,
    pub amount: u64,
    pub fee: u64,
    pub nonce: u64,
    pub memo: String,
}

impl PaymentPayload {
    /// Signing message: SHA3-256 over the payload's JSON encoding.
    pub fn digest(&self) -> Result<[u8; 32]> {
        let encoded = serde_json::to_vec(self)?;
        Ok(Sha3_256::digest(&encoded).into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedPayment {
    pub payload: PaymentPayload,
    /// Hex-encoded 64-byte Ed25519 signature
    pub signature: String,
}

pub struct PoolWallet {
    signing_key: SigningKey,
    pub public_key_hex: String,
}

impl PoolWallet {
    /// Create a wallet from a 64-char hex secret key.
    pub fn new(secret_key_hex: &str) -> Result<Self> {
        let mut sk_bytes = hex::decode(secret_key_hex.trim())
            .map_err(|_| anyhow!("Invalid sender secret key hex"))?;

        if sk_bytes.len() != 32 {
            let len = sk_bytes.len();
            sk_bytes.zeroize();
            return Err(anyhow!(
                "Sender secret key must be 32 bytes (64 hex chars), got {}",
                len
            ));
        }

        let mut secret_key = [0u8; 32];
        secret_key.copy_from_slice(&sk_bytes);
        sk_bytes.zeroize();

        let signing_key = SigningKey::from_bytes(&secret_key);
        secret_key.zeroize();

        let public_key_hex = hex::encode(signing_key.verifying_key().as_bytes());
        tracing::info!("Sender wallet initialized: pubkey={}...", &public_key_hex[..16]);

        Ok(Self {
            signing_key,
            public_key_hex,
        })
    }

    pub fn sign(&self, payload: PaymentPayload) -> Result<SignedPayment> {
        let digest = payload.digest()?;
        let signature = self.signing_key.sign(&digest);

        // self-check before anything is submitted
        self.signing_key
            .verifying_key()
            .verify(&digest, &signature)
            .map_err(|_| anyhow!("Self-verification of payment signature failed"))?;

        Ok(SignedPayment {
            payload,
            signature: hex::encode(signature.to_bytes()),
        })
    }
}

/// Verify a signed payment against a hex-encoded Ed25519 public key.
pub fn verify_payment(payment: &SignedPayment, public_key_hex: &str) -> Result<bool> {
    let pk_bytes: [u8; 32] = hex::decode(public_key_hex)
        .context("public key is not hex")?
        .try_into()
        .map_err(|_| anyhow!("public key must be 32 bytes"))?;
    let sig_bytes: [u8; 64] = hex::decode(&payment.signature)
        .context("signature is not hex")?
        .try_into()
        .map_err(|_| anyhow!("signature must be 64 bytes"))?;

    let verifying_key = VerifyingKey::from_bytes(&pk_bytes)?;
    let signature = Signature::from_bytes(&sig_bytes);
    let digest = payment.payload.digest()?;
    Ok(verifying_key.verify(&digest, &signature).is_ok())
}
