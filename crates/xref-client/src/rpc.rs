use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use xref_types::{Address, TxId};

use crate::error::{ClientError, ClientResult};
use crate::signer::Signer;
use crate::traits::LedgerClient;
use crate::types::{Receipt, TxPayload, ViewCall};

const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC connection to a ledger node.
pub struct HttpLedgerClient {
    base_url: String,
    http: reqwest::Client,
    signer: Arc<Signer>,
    timeout: Duration,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl HttpLedgerClient {
    pub fn new(base_url: &str, signer: Arc<Signer>) -> Self {
        Self::with_timeout(base_url, signer, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: &str, signer: Arc<Signer>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            signer,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, method: &str, params: Value) -> ClientResult<Value> {
        let body = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            id: uuid::Uuid::now_v7().to_string(),
        };

        let response = self
            .http
            .post(&self.base_url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::Transport(format!(
                "{method} answered with HTTP {}",
                response.status()
            )));
        }

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if let Some(error) = parsed.error {
            tracing::debug!(method, code = error.code, "node answered with an rpc error");
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        parsed
            .result
            .ok_or_else(|| ClientError::InvalidResponse(format!("{method}: neither result nor error")))
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn call_view(&self, call: &ViewCall) -> ClientResult<Value> {
        self.request(
            "ledger_call",
            json!([{
                "to": call.contract,
                "method": call.method,
                "args": call.args,
            }]),
        )
        .await
    }

    async fn submit_transaction(&self, tx: &TxPayload) -> ClientResult<TxId> {
        let canonical =
            serde_json::to_vec(tx).map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let signature = self.signer.sign(&canonical);
        let from = tx.from.clone().unwrap_or_else(|| self.signer.address().clone());

        let result = self
            .request(
                "ledger_sendTransaction",
                json!([{ "payload": tx, "from": from, "signature": signature }]),
            )
            .await
            .map_err(|e| match e {
                // The node refusing a submission is a submission error no
                // matter how the refusal travelled; keep the text verbatim.
                ClientError::Rpc { message, .. } => ClientError::Submission(message),
                ClientError::Transport(message) => ClientError::Submission(message),
                other => other,
            })?;

        let tx_hex = result
            .as_str()
            .ok_or_else(|| ClientError::InvalidResponse("transaction id is not a string".into()))?;
        TxId::parse(tx_hex).map_err(Into::into)
    }

    async fn get_receipt(&self, tx_id: &TxId) -> ClientResult<Option<Receipt>> {
        let result = self
            .request("ledger_getReceipt", json!([tx_id]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        serde_json::from_value(result)
            .map(Some)
            .map_err(|e| ClientError::InvalidResponse(format!("malformed receipt: {e}")))
    }

    async fn estimate_gas(&self, tx: &TxPayload) -> ClientResult<u64> {
        let result = self.request("ledger_estimateGas", json!([tx])).await?;
        as_u64(&result, "gas estimate")
    }

    async fn current_nonce(&self, address: &Address) -> ClientResult<u64> {
        let result = self.request("ledger_nonce", json!([address])).await?;
        as_u64(&result, "nonce")
    }

    async fn current_gas_price(&self) -> ClientResult<u64> {
        let result = self.request("ledger_gasPrice", json!([])).await?;
        as_u64(&result, "gas price")
    }

    fn signer_address(&self) -> &Address {
        self.signer.address()
    }
}

fn as_u64(value: &Value, what: &str) -> ClientResult<u64> {
    value
        .as_u64()
        .ok_or_else(|| ClientError::InvalidResponse(format!("{what} is not an unsigned integer")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let signer = Arc::new(Signer::from_bytes([1; 32]));
        let client = HttpLedgerClient::new("http://localhost:8545/", signer);
        assert_eq!(client.base_url(), "http://localhost:8545");
    }

    #[test]
    fn signer_address_is_exposed() {
        let signer = Arc::new(Signer::from_bytes([2; 32]));
        let expected = signer.address().clone();
        let client = HttpLedgerClient::new("http://localhost:8545", signer);
        assert_eq!(client.signer_address(), &expected);
    }

    #[test]
    fn as_u64_rejects_non_integers() {
        assert!(as_u64(&Value::from("7"), "nonce").is_err());
        assert_eq!(as_u64(&Value::from(7), "nonce").unwrap(), 7);
    }
}
