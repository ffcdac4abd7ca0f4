use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use xref_types::{Address, RecordId, SubjectId, TxId};

use crate::error::{RegistryError, RegistryResult};

/// One entry of the public ledger's record table.
///
/// `record_id`, `subject_id`, `initiator`, and `created_at` are fixed at
/// reservation time. `private_tx_id` starts as the placeholder and moves to
/// the real transaction id exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossRecord {
    pub record_id: RecordId,
    pub private_tx_id: TxId,
    pub subject_id: SubjectId,
    pub initiator: Address,
    pub created_at: DateTime<Utc>,
}

/// Contract wire form: timestamps travel as unix seconds.
#[derive(Deserialize)]
struct RecordWire {
    record_id: u64,
    private_tx_id: TxId,
    subject_id: SubjectId,
    initiator: Address,
    created_at: i64,
}

impl CrossRecord {
    pub fn from_value(value: Value) -> RegistryResult<Self> {
        let wire: RecordWire = serde_json::from_value(value)
            .map_err(|e| RegistryError::MalformedRecord(e.to_string()))?;
        let created_at = Utc
            .timestamp_opt(wire.created_at, 0)
            .single()
            .ok_or_else(|| {
                RegistryError::MalformedRecord(format!("timestamp out of range: {}", wire.created_at))
            })?;
        Ok(Self {
            record_id: RecordId(wire.record_id),
            private_tx_id: wire.private_tx_id,
            subject_id: wire.subject_id,
            initiator: wire.initiator,
            created_at,
        })
    }

    pub fn is_patched(&self) -> bool {
        !self.private_tx_id.is_placeholder()
    }
}
