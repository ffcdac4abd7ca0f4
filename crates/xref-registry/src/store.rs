use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use xref_client::{ContractHandle, LedgerClient, Receipt, ReceiptStatus, TxPayload};
use xref_types::{Address, RecordId, SubjectId, TxId};

use crate::error::{RegistryError, RegistryResult};
use crate::history::{build_history, HistoryReport};
use crate::record::CrossRecord;

/// How long to poll the public ledger for a submission of our own to mine.
#[derive(Clone, Copy, Debug)]
pub struct SettlePolicy {
    pub poll_interval: Duration,
    pub max_polls: u32,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            max_polls: 60,
        }
    }
}

/// Outcome of a record reservation.
///
/// `record_id` is the authoritative id, taken from the reservation call's
/// own return value. Any count read before reserving is a logging hint
/// only; concurrent reservations can observe the same count.
#[derive(Clone, Debug)]
pub struct Reservation {
    pub record_id: RecordId,
    pub tx_id: TxId,
    pub block_number: u64,
    pub gas_used: u64,
}

/// Receipt metadata of a settled patch.
#[derive(Clone, Debug)]
pub struct PatchReceipt {
    pub tx_id: TxId,
    pub block_number: u64,
    pub gas_used: u64,
}

/// Typed accessor over the public-ledger record contract.
pub struct Registry<C: ?Sized> {
    contract: ContractHandle<C>,
    settle: SettlePolicy,
}

// Manual impl: Clone must not require C: Clone behind the handle's Arc.
impl<C: ?Sized> Clone for Registry<C> {
    fn clone(&self) -> Self {
        Self {
            contract: self.contract.clone(),
            settle: self.settle,
        }
    }
}

impl<C: LedgerClient + ?Sized> Registry<C> {
    pub fn new(contract_address: Address, client: Arc<C>) -> Self {
        Self::with_settle_policy(contract_address, client, SettlePolicy::default())
    }

    pub fn with_settle_policy(
        contract_address: Address,
        client: Arc<C>,
        settle: SettlePolicy,
    ) -> Self {
        Self {
            contract: ContractHandle::new(contract_address, client),
            settle,
        }
    }

    pub async fn count_records(&self) -> RegistryResult<u64> {
        let value = self.contract.view("record_count", vec![]).await?;
        value
            .as_u64()
            .ok_or_else(|| RegistryError::MalformedRecord("record count is not an integer".into()))
    }

    /// Reserve a record carrying the placeholder transaction id.
    ///
    /// Returns once the reservation has mined; the record id comes from the
    /// reservation receipt itself.
    pub async fn reserve_record(
        &self,
        subject: &SubjectId,
        initiator: &Address,
    ) -> RegistryResult<Reservation> {
        let tx_id = self
            .contract
            .send(
                "reserve_record",
                &[
                    json!(TxId::placeholder()),
                    json!(subject),
                    json!(initiator),
                ],
            )
            .await?;

        let receipt = self.wait_settled(&tx_id, "reservation").await?;
        if receipt.status == ReceiptStatus::Failure {
            return Err(RegistryError::ReservationReverted);
        }

        let record_id = receipt
            .output
            .as_ref()
            .and_then(Value::as_u64)
            .map(RecordId)
            .ok_or_else(|| {
                RegistryError::MalformedRecord("reservation receipt carries no record id".into())
            })?;

        tracing::info!(
            record_id = %record_id,
            tx = %tx_id.short(),
            subject = %subject,
            "cross-reference record reserved"
        );

        Ok(Reservation {
            record_id,
            tx_id,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }

    /// Patch a record's placeholder with the verified private transaction id.
    ///
    /// Refuses to touch a record that was already patched. Gas, price, and
    /// nonce are pinned explicitly; `from_override` selects a test-harness
    /// wallet instead of the process signer.
    pub async fn patch_record_hash(
        &self,
        record_id: RecordId,
        private_tx_id: &TxId,
        from_override: Option<&Address>,
    ) -> RegistryResult<PatchReceipt> {
        let existing = self.get_record(record_id).await?;
        if existing.is_patched() {
            return Err(RegistryError::AlreadyPatched(record_id));
        }

        let client = self.contract.client();
        let from = from_override
            .unwrap_or_else(|| client.signer_address())
            .clone();
        let data = self
            .contract
            .call_data("patch_record_hash", &[json!(record_id.value()), json!(private_tx_id)]);

        let mut payload = TxPayload {
            to: self.contract.address().clone(),
            from: from_override.cloned(),
            data,
            gas: None,
            gas_price: None,
            nonce: None,
        };

        let estimate = client.estimate_gas(&payload).await?;
        payload.gas = Some(estimate + estimate / 5);
        payload.gas_price = Some(client.current_gas_price().await?);
        payload.nonce = Some(client.current_nonce(&from).await?);

        let tx_id = self.contract.send_with(payload).await?;
        let receipt = self.wait_settled(&tx_id, "patch").await?;
        if receipt.status == ReceiptStatus::Failure {
            return Err(RegistryError::PatchReverted);
        }

        tracing::info!(
            record_id = %record_id,
            patch_tx = %tx_id.short(),
            private_tx = %private_tx_id.short(),
            "record hash patched"
        );

        Ok(PatchReceipt {
            tx_id,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }

    pub async fn get_record(&self, record_id: RecordId) -> RegistryResult<CrossRecord> {
        let value = self
            .contract
            .view("get_record", vec![json!(record_id.value())])
            .await?;
        CrossRecord::from_value(value)
    }

    /// Read the whole record table. Records that fail to decode are
    /// skipped, matching the read path's tolerance for stray entries.
    pub async fn all_records(&self) -> RegistryResult<Vec<CrossRecord>> {
        let count = self.count_records().await?;
        let mut records = Vec::with_capacity(count as usize);
        for id in 0..count {
            match self.get_record(RecordId(id)).await {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(record_id = id, error = %e, "skipping unreadable record");
                }
            }
        }
        Ok(records)
    }

    /// One page of a subject's history, newest first.
    pub async fn subject_history(
        &self,
        subject: &SubjectId,
        page: usize,
        limit: usize,
    ) -> RegistryResult<HistoryReport> {
        let all = self.all_records().await?;
        Ok(build_history(&all, subject, page, limit))
    }

    async fn wait_settled(&self, tx_id: &TxId, what: &str) -> RegistryResult<Receipt> {
        for _ in 0..self.settle.max_polls {
            match self.contract.client().get_receipt(tx_id).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(tx = %tx_id.short(), error = %e, "settle poll failed");
                }
            }
            tokio::time::sleep(self.settle.poll_interval).await;
        }
        Err(RegistryError::SettleTimeout {
            what: what.to_string(),
            polls: self.settle.max_polls,
        })
    }
}
