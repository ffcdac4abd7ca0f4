use std::sync::Arc;

use serde_json::Value;

use xref_types::{Address, TxId};

use crate::error::ClientResult;
use crate::traits::LedgerClient;
use crate::types::{CallData, TxPayload, ViewCall};

/// The two primitive operations of one contract on one ledger.
///
/// Everything the engine knows about contract state flows through `view`
/// (read) and `send` (stateful); the contract's own logic is assumed
/// correct and is never interpreted here.
pub struct ContractHandle<C: ?Sized> {
    address: Address,
    client: Arc<C>,
}

impl<C: LedgerClient + ?Sized> ContractHandle<C> {
    pub fn new(address: Address, client: Arc<C>) -> Self {
        Self { address, client }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// ABI payload for a method call, without submitting it.
    pub fn call_data(&self, method: &str, args: &[Value]) -> CallData {
        CallData::encode(method, args)
    }

    /// Read-only call.
    pub async fn view(&self, method: &str, args: Vec<Value>) -> ClientResult<Value> {
        self.client
            .call_view(&ViewCall {
                contract: self.address.clone(),
                method: method.to_string(),
                args,
            })
            .await
    }

    /// Stateful call with gas management left to the node.
    pub async fn send(&self, method: &str, args: &[Value]) -> ClientResult<TxId> {
        let payload = TxPayload::call(self.address.clone(), self.call_data(method, args));
        self.client.submit_transaction(&payload).await
    }

    /// Stateful call with explicit gas, price, and nonce.
    pub async fn send_with(&self, payload: TxPayload) -> ClientResult<TxId> {
        self.client.submit_transaction(&payload).await
    }
}

// Manual impl: Clone must not require C: Clone behind the Arc.
impl<C: ?Sized> Clone for ContractHandle<C> {
    fn clone(&self) -> Self {
        Self {
            address: self.address.clone(),
            client: Arc::clone(&self.client),
        }
    }
}
