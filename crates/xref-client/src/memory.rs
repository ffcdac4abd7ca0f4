use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use xref_types::{Address, TxId};

use crate::error::{ClientError, ClientResult};
use crate::traits::LedgerClient;
use crate::types::{Receipt, ReceiptStatus, TxPayload, ViewCall};

/// In-memory ledger for tests, local demos, and embedding.
///
/// Views, receipts, and submission outcomes are staged ahead of time;
/// faults (absent receipts, transport blips, node rejections, slow
/// settlement) are injected the same way. Submissions mint deterministic
/// transaction ids and settle according to the next [`StagedSettle`] in
/// the queue, defaulting to immediate success.
pub struct InMemoryLedger {
    address: Address,
    inner: Mutex<State>,
}

#[derive(Default)]
struct State {
    views: HashMap<String, ViewScript>,
    receipts: HashMap<TxId, ReceiptScript>,
    poll_counts: HashMap<TxId, u32>,
    submissions: Vec<TxPayload>,
    settles: VecDeque<StagedSettle>,
    next_tx: u64,
    next_block: u64,
    nonce: u64,
    gas_price: u64,
    gas_estimate: u64,
}

enum ViewScript {
    Sticky(Value),
    Series(VecDeque<Value>),
}

struct ReceiptScript {
    transport_failures: u32,
    absent_polls: u32,
    receipt: Receipt,
}

/// How the next submission against an [`InMemoryLedger`] settles.
#[derive(Clone, Debug)]
pub struct StagedSettle {
    /// Reject the submission outright with this message.
    pub reject: Option<String>,
    /// Stall the submission before the node answers.
    pub delay: Option<Duration>,
    /// Number of receipt polls that see "not yet mined".
    pub absent_polls: u32,
    pub status: ReceiptStatus,
    /// Contract return value surfaced on the receipt.
    pub output: Option<Value>,
    pub gas_used: u64,
}

impl Default for StagedSettle {
    fn default() -> Self {
        Self {
            reject: None,
            delay: None,
            absent_polls: 0,
            status: ReceiptStatus::Success,
            output: None,
            gas_used: 30_000,
        }
    }
}

impl StagedSettle {
    pub fn rejected(message: &str) -> Self {
        Self {
            reject: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn delayed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn with_output(output: Value) -> Self {
        Self {
            output: Some(output),
            ..Self::default()
        }
    }
}

impl InMemoryLedger {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            inner: Mutex::new(State {
                next_block: 1,
                gas_price: 1_000_000_000,
                gas_estimate: 30_000,
                ..State::default()
            }),
        }
    }

    fn lock(&self) -> ClientResult<std::sync::MutexGuard<'_, State>> {
        self.inner
            .lock()
            .map_err(|_| ClientError::Transport("ledger state lock poisoned".into()))
    }

    /// Stage a view result returned for every call of `method`.
    pub fn stage_view(&self, method: &str, value: Value) {
        if let Ok(mut state) = self.inner.lock() {
            state
                .views
                .insert(method.to_string(), ViewScript::Sticky(value));
        }
    }

    /// Stage a sequence of view results consumed one call at a time.
    pub fn stage_view_series(&self, method: &str, values: Vec<Value>) {
        if let Ok(mut state) = self.inner.lock() {
            state
                .views
                .insert(method.to_string(), ViewScript::Series(values.into()));
        }
    }

    /// Stage a receipt available on the first poll.
    pub fn stage_receipt(&self, receipt: Receipt) {
        self.stage_receipt_after(0, receipt);
    }

    /// Stage a receipt that is absent for the first `absent_polls` polls.
    pub fn stage_receipt_after(&self, absent_polls: u32, receipt: Receipt) {
        if let Ok(mut state) = self.inner.lock() {
            state.receipts.insert(
                receipt.tx_id.clone(),
                ReceiptScript {
                    transport_failures: 0,
                    absent_polls,
                    receipt,
                },
            );
        }
    }

    /// Stage a receipt behind `transport_failures` failing polls.
    pub fn stage_flaky_receipt(&self, transport_failures: u32, receipt: Receipt) {
        if let Ok(mut state) = self.inner.lock() {
            state.receipts.insert(
                receipt.tx_id.clone(),
                ReceiptScript {
                    transport_failures,
                    absent_polls: 0,
                    receipt,
                },
            );
        }
    }

    /// Queue the settlement behavior for the next submission.
    pub fn stage_settlement(&self, settle: StagedSettle) {
        if let Ok(mut state) = self.inner.lock() {
            state.settles.push_back(settle);
        }
    }

    /// Accepted submissions, in order.
    pub fn submissions(&self) -> Vec<TxPayload> {
        self.inner
            .lock()
            .map(|state| state.submissions.clone())
            .unwrap_or_default()
    }

    /// How many times a receipt has been polled.
    pub fn poll_count(&self, tx_id: &TxId) -> u32 {
        self.inner
            .lock()
            .ok()
            .and_then(|state| state.poll_counts.get(tx_id).copied())
            .unwrap_or(0)
    }

    pub fn set_nonce(&self, nonce: u64) {
        if let Ok(mut state) = self.inner.lock() {
            state.nonce = nonce;
        }
    }

    pub fn set_gas_price(&self, gas_price: u64) {
        if let Ok(mut state) = self.inner.lock() {
            state.gas_price = gas_price;
        }
    }

    pub fn set_gas_estimate(&self, gas_estimate: u64) {
        if let Ok(mut state) = self.inner.lock() {
            state.gas_estimate = gas_estimate;
        }
    }

    fn mint_tx_id(counter: u64) -> TxId {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&counter.to_be_bytes());
        TxId::from_bytes(&bytes)
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn call_view(&self, call: &ViewCall) -> ClientResult<Value> {
        let mut state = self.lock()?;
        match state.views.get_mut(&call.method) {
            None => Err(ClientError::Rpc {
                code: -32601,
                message: format!("method not available: {}", call.method),
            }),
            Some(ViewScript::Sticky(value)) => Ok(value.clone()),
            Some(ViewScript::Series(queue)) => queue.pop_front().ok_or(ClientError::Rpc {
                code: -32000,
                message: format!("view series exhausted: {}", call.method),
            }),
        }
    }

    async fn submit_transaction(&self, tx: &TxPayload) -> ClientResult<TxId> {
        let (tx_id, delay) = {
            let mut state = self.lock()?;
            let settle = state.settles.pop_front().unwrap_or_default();

            if let Some(message) = settle.reject {
                return Err(ClientError::Submission(message));
            }

            state.next_tx += 1;
            let tx_id = Self::mint_tx_id(state.next_tx);
            let block_number = state.next_block;
            state.next_block += 1;

            let receipt = Receipt {
                tx_id: tx_id.clone(),
                status: settle.status,
                from: tx.from.clone().unwrap_or_else(|| self.address.clone()),
                block_number,
                gas_used: settle.gas_used,
                logs: Vec::new(),
                output: settle.output,
            };
            state.receipts.insert(
                tx_id.clone(),
                ReceiptScript {
                    transport_failures: 0,
                    absent_polls: settle.absent_polls,
                    receipt,
                },
            );
            state.submissions.push(tx.clone());
            (tx_id, settle.delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(tx_id)
    }

    async fn get_receipt(&self, tx_id: &TxId) -> ClientResult<Option<Receipt>> {
        let mut state = self.lock()?;
        *state.poll_counts.entry(tx_id.clone()).or_insert(0) += 1;

        let Some(script) = state.receipts.get_mut(tx_id) else {
            return Ok(None);
        };
        if script.transport_failures > 0 {
            script.transport_failures -= 1;
            return Err(ClientError::Transport("connection reset by node".into()));
        }
        if script.absent_polls > 0 {
            script.absent_polls -= 1;
            return Ok(None);
        }
        Ok(Some(script.receipt.clone()))
    }

    async fn estimate_gas(&self, _tx: &TxPayload) -> ClientResult<u64> {
        Ok(self.lock()?.gas_estimate)
    }

    async fn current_nonce(&self, _address: &Address) -> ClientResult<u64> {
        Ok(self.lock()?.nonce)
    }

    async fn current_gas_price(&self) -> ClientResult<u64> {
        Ok(self.lock()?.gas_price)
    }

    fn signer_address(&self) -> &Address {
        &self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CallData;

    fn addr(byte: u8) -> Address {
        Address::from_bytes(&[byte; 20])
    }

    fn ledger() -> InMemoryLedger {
        InMemoryLedger::new(addr(1))
    }

    fn payload() -> TxPayload {
        TxPayload::call(addr(2), CallData::encode("m", &[]))
    }

    fn view(method: &str) -> ViewCall {
        ViewCall {
            contract: addr(2),
            method: method.to_string(),
            args: vec![],
        }
    }

    #[tokio::test]
    async fn unknown_receipt_is_absent_not_an_error() {
        let l = ledger();
        let tx = TxId::from_bytes(&[9; 32]);
        assert!(l.get_receipt(&tx).await.unwrap().is_none());
        assert_eq!(l.poll_count(&tx), 1);
    }

    #[tokio::test]
    async fn staged_receipt_appears_after_absent_polls() {
        let l = ledger();
        let receipt = Receipt::success(TxId::from_bytes(&[1; 32]), addr(3));
        l.stage_receipt_after(2, receipt.clone());

        assert!(l.get_receipt(&receipt.tx_id).await.unwrap().is_none());
        assert!(l.get_receipt(&receipt.tx_id).await.unwrap().is_none());
        assert_eq!(l.get_receipt(&receipt.tx_id).await.unwrap(), Some(receipt));
    }

    #[tokio::test]
    async fn flaky_receipt_fails_then_settles() {
        let l = ledger();
        let receipt = Receipt::success(TxId::from_bytes(&[2; 32]), addr(3));
        l.stage_flaky_receipt(1, receipt.clone());

        let err = l.get_receipt(&receipt.tx_id).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(l.get_receipt(&receipt.tx_id).await.unwrap(), Some(receipt));
    }

    #[tokio::test]
    async fn submission_mints_ids_and_settles_with_output() {
        let l = ledger();
        l.stage_settlement(StagedSettle::with_output(Value::from(5)));

        let tx = l.submit_transaction(&payload()).await.unwrap();
        let receipt = l.get_receipt(&tx).await.unwrap().unwrap();
        assert_eq!(receipt.output, Some(Value::from(5)));
        assert_eq!(l.submissions().len(), 1);
    }

    #[tokio::test]
    async fn rejected_submission_is_not_recorded() {
        let l = ledger();
        l.stage_settlement(StagedSettle::rejected("insufficient funds"));

        let err = l.submit_transaction(&payload()).await.unwrap_err();
        assert!(matches!(err, ClientError::Submission(m) if m == "insufficient funds"));
        assert!(l.submissions().is_empty());
    }

    #[tokio::test]
    async fn settle_queue_is_consumed_in_order() {
        let l = ledger();
        l.stage_settlement(StagedSettle::rejected("first"));
        // Second submission falls through to the default success.

        assert!(l.submit_transaction(&payload()).await.is_err());
        assert!(l.submit_transaction(&payload()).await.is_ok());
    }

    #[tokio::test]
    async fn sticky_and_series_views() {
        let l = ledger();
        l.stage_view("count", Value::from(3));
        l.stage_view_series("get", vec![Value::from("a"), Value::from("b")]);

        assert_eq!(l.call_view(&view("count")).await.unwrap(), Value::from(3));
        assert_eq!(l.call_view(&view("count")).await.unwrap(), Value::from(3));
        assert_eq!(l.call_view(&view("get")).await.unwrap(), Value::from("a"));
        assert_eq!(l.call_view(&view("get")).await.unwrap(), Value::from("b"));
        assert!(l.call_view(&view("get")).await.is_err());
        assert!(l.call_view(&view("missing")).await.is_err());
    }

    #[tokio::test]
    async fn gas_accessors_reflect_staged_values() {
        let l = ledger();
        l.set_nonce(7);
        l.set_gas_price(42);
        l.set_gas_estimate(100_000);

        assert_eq!(l.current_nonce(&addr(1)).await.unwrap(), 7);
        assert_eq!(l.current_gas_price().await.unwrap(), 42);
        assert_eq!(l.estimate_gas(&payload()).await.unwrap(), 100_000);
    }
}
