use async_trait::async_trait;
use serde_json::Value;

use xref_types::{Address, TxId};

use crate::error::ClientResult;
use crate::types::{Receipt, TxPayload, ViewCall};

/// One JSON-RPC connection to one ledger.
///
/// Safe for concurrent reads; the node serializes writes and owns nonce
/// management unless a payload pins the nonce explicitly.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Execute a read-only contract call. Must not mutate state.
    async fn call_view(&self, call: &ViewCall) -> ClientResult<Value>;

    /// Sign and submit a stateful transaction.
    ///
    /// Fails with [`ClientError::Submission`](crate::ClientError::Submission)
    /// when the RPC connection rejects the call.
    async fn submit_transaction(&self, tx: &TxPayload) -> ClientResult<TxId>;

    /// Fetch the receipt for a transaction, or `None` if it has not been
    /// mined yet. Never blocks waiting for mining.
    async fn get_receipt(&self, tx_id: &TxId) -> ClientResult<Option<Receipt>>;

    async fn estimate_gas(&self, tx: &TxPayload) -> ClientResult<u64>;

    async fn current_nonce(&self, address: &Address) -> ClientResult<u64>;

    async fn current_gas_price(&self) -> ClientResult<u64>;

    /// The address of the signer held by this connection.
    fn signer_address(&self) -> &Address;
}
