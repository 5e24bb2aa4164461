/// Node GraphQL client - nonce lookup and signed payment submission
///
/// JSON POST over hyper with a per-request timeout and a circuit breaker that
/// pauses calls after repeated transport failures.

use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{body::Buf, Method, Request};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::payout::wallet::SignedPayment;

const GET_NONCE: &str = r#"query GetNonce($publicKey: PublicKey!) {
  account(publicKey: $publicKey) {
    inferredNonce
  }
}"#;

const SEND_PAYMENT: &str = r#"mutation SendSignedPayment($input: SendPaymentInput!, $signature: SignatureInput!) {
  sendPayment(input: $input, signature: $signature) {
    payment {
      hash
      amount
      fee
      nonce
      memo
    }
  }
}"#;

/// Node operations needed to send a batch of payouts.
#[allow(async_fn_in_trait)]
pub trait PaymentNode {
    async fn inferred_nonce(&self, public_key: &str) -> Result<u64>;

    async fn send_payment(&self, payment: &SignedPayment) -> Result<Value>;
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest<'a> {
    pub query: &'a str,
    pub variables: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Value>,
}

#[derive(Debug, Clone)]
struct CircuitBreaker {
    failures: u32,
    last_failure: Option<Instant>,
    is_open: bool,
    max_failures: u32,
    reset_timeout: Duration,
}

impl CircuitBreaker {
    fn new() -> Self {
        Self {
            failures: 0,
            last_failure: None,
            is_open: false,
            max_failures: 5,
            reset_timeout: Duration::from_secs(60),
        }
    }

    fn record_failure(&mut self) {
        self.failures += 1;
        self.last_failure = Some(Instant::now());

        if self.failures >= self.max_failures {
            self.is_open = true;
            tracing::error!(
                "Circuit breaker tripped after {} failures, pausing GraphQL for {}s",
                self.failures,
                self.reset_timeout.as_secs()
            );
        }
    }

    fn record_success(&mut self) {
        if self.failures > 0 {
            self.failures = 0;
            tracing::info!("Circuit breaker reset after a successful call");
        }
    }

    fn check(&mut self) -> Result<()> {
        if self.is_open {
            if let Some(last_fail) = self.last_failure {
                if last_fail.elapsed() > self.reset_timeout {
                    tracing::info!("Circuit breaker half-open, retrying");
                    self.is_open = false;
                    self.failures = 0;
                } else {
                    return Err(anyhow!("GraphQL circuit breaker is open"));
                }
            }
        }
        Ok(())
    }
}

pub struct GraphQLClient {
    url: String,
    timeout: Duration,
    client: Client<HttpConnector, Full<Bytes>>,
    circuit_breaker: Arc<RwLock<CircuitBreaker>>,
}

impl GraphQLClient {
    pub fn new(url: &str, timeout: Option<Duration>) -> Self {
        let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build_http();

        tracing::info!("GraphQLClient initialized: {}", url);

        Self {
            url: url.to_string(),
            timeout: timeout.unwrap_or(Duration::from_secs(30)),
            client,
            circuit_breaker: Arc::new(RwLock::new(CircuitBreaker::new())),
        }
    }

    /// Run one query or mutation and return its `data` object.
    pub async fn call(&self, query: &str, variables: Value) -> Result<Value> {
        self.circuit_breaker.write().await.check()?;

        let body_bytes = serde_json::to_vec(&GraphQLRequest { query, variables })?;
        let req = Request::builder()
            .method(Method::POST)
            .uri(&self.url)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body_bytes)))?;

        let response = match tokio::time::timeout(self.timeout, self.client.request(req)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                self.circuit_breaker.write().await.record_failure();
                return Err(anyhow!("GraphQL connection failed: {}", e));
            }
            Err(_) => {
                self.circuit_breaker.write().await.record_failure();
                return Err(anyhow!("GraphQL request timeout"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.circuit_breaker.write().await.record_failure();
            return Err(anyhow!("GraphQL HTTP error: {}", status));
        }

        let body = response.into_body().collect().await?.to_bytes();
        let parsed: GraphQLResponse = serde_json::from_reader(body.reader())?;

        // application errors do not trip the breaker
        if let Some(errors) = parsed.errors {
            tracing::error!("GraphQL error: {}", errors);
            return Err(anyhow!("GraphQL error: {}", errors));
        }

        self.circuit_breaker.write().await.record_success();
        Ok(parsed.data.unwrap_or(Value::Null))
    }
}

impl PaymentNode for GraphQLClient {
    async fn inferred_nonce(&self, public_key: &str) -> Result<u64> {
        let data = self
            .call(GET_NONCE, json!({ "publicKey": public_key }))
            .await
            .context("failed to query account nonce")?;
        parse_nonce(&data)
    }

    async fn send_payment(&self, payment: &SignedPayment) -> Result<Value> {
        let variables = json!({
            "input": {
                "from": payment.payload.from,
                "to": payment.payload.to,
                "amount": payment.payload.amount.to_string(),
                "fee": payment.payload.fee.to_string(),
                "nonce": payment.payload.nonce.to_string(),
                "memo": payment.payload.memo,
            },
            "signature": {
                "rawSignature": payment.signature,
            }
        });
        self.call(SEND_PAYMENT, variables).await
    }
}

/// `inferredNonce` is a string in the node schema; a missing account starts
/// at zero.
fn parse_nonce(data: &Value) -> Result<u64> {
    match data.pointer("/account/inferredNonce") {
        None | Some(Value::Null) => Ok(0),
        Some(Value::String(s)) => s
            .parse()
            .with_context(|| format!("invalid inferredNonce {:?}", s)),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| anyhow!("invalid inferredNonce {}", n)),
        Some(other) => Err(anyhow!("unexpected inferredNonce {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_breaker() {
        let mut breaker = CircuitBreaker::new();
        assert!(!breaker.is_open);

        for _ in 0..4 {
            breaker.record_failure();
            assert!(!breaker.is_open);
        }

        breaker.record_failure();
        assert!(breaker.is_open);
        assert!(breaker.check().is_err());
    }

    #[test]
    fn test_circuit_breaker_success_clears_failures() {
        let mut breaker = CircuitBreaker::new();
        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();
        assert_eq!(breaker.failures, 0);
        assert!(breaker.check().is_ok());
    }

    #[test]
    fn test_parse_nonce() {
        assert_eq!(parse_nonce(&json!({"account": {"inferredNonce": "17"}})).unwrap(), 17);
        assert_eq!(parse_nonce(&json!({"account": {"inferredNonce": 3}})).unwrap(), 3);
        assert_eq!(parse_nonce(&json!({"account": null})).unwrap(), 0);
        assert!(parse_nonce(&json!({"account": {"inferredNonce": "x"}})).is_err());
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = GraphQLClient::new("http://127.0.0.1:3085/graphql", None);
        assert_eq!(client.url, "http://127.0.0.1:3085/graphql");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }
}
