use serde::{Deserialize, Serialize};

use xref_types::{Address, OperationStatus, RecordId, SubjectId, TxId};

/// Sender and block metadata of the verified private-ledger effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedEffect {
    pub sender: Address,
    pub block_number: u64,
    pub gas_used: u64,
}

/// Ties a report to the records it touched. Enough detail for a client to
/// retry the patch step independently later.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAnchor {
    pub record_id: RecordId,
    pub reservation_tx_id: TxId,
    pub private_tx_id: TxId,
    pub subject_id: SubjectId,
}

/// Receipt metadata of the settled public-side patch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicReceiptInfo {
    pub tx_id: TxId,
    pub block_number: u64,
    pub gas_used: u64,
}

/// Detail payload for an initiator/sender mismatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderMismatch {
    pub expected: Address,
    pub actual: Address,
}

/// The one result shape every confirmation produces.
///
/// `Synced` and `Partial` are overall successes: the authoritative
/// private-ledger state change happened. `Partial` carries a warning
/// describing what the public side still owes. Only `Failed` reports an
/// operation that did not take effect (or could not be shown to).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncReport {
    Synced {
        status: OperationStatus,
        record: RecordAnchor,
        patch: PublicReceiptInfo,
        verified: VerifiedEffect,
    },
    Partial {
        status: OperationStatus,
        record: RecordAnchor,
        warning: String,
        is_timeout: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        verified: Option<VerifiedEffect>,
    },
    Failed {
        status: OperationStatus,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mismatch: Option<SenderMismatch>,
    },
}

impl SyncReport {
    /// Overall success as the API surface reports it.
    pub fn success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    pub fn status(&self) -> OperationStatus {
        match self {
            Self::Synced { status, .. }
            | Self::Partial { status, .. }
            | Self::Failed { status, .. } => *status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> RecordAnchor {
        RecordAnchor {
            record_id: RecordId(4),
            reservation_tx_id: TxId::from_bytes(&[1; 32]),
            private_tx_id: TxId::from_bytes(&[2; 32]),
            subject_id: SubjectId::parse("42").unwrap(),
        }
    }

    #[test]
    fn partial_counts_as_success() {
        let report = SyncReport::Partial {
            status: OperationStatus::RecordTimeout,
            record: anchor(),
            warning: "public network congestion".into(),
            is_timeout: true,
            verified: None,
        };
        assert!(report.success());
        assert_eq!(report.status(), OperationStatus::RecordTimeout);
    }

    #[test]
    fn failed_is_not_success() {
        let report = SyncReport::Failed {
            status: OperationStatus::VerificationFailed,
            message: "transaction reverted".into(),
            mismatch: None,
        };
        assert!(!report.success());
    }

    #[test]
    fn serialization_is_tagged() {
        let report = SyncReport::Failed {
            status: OperationStatus::RecordFailed,
            message: "boom".into(),
            mismatch: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["status"], "record_failed");
        assert!(json.get("mismatch").is_none());
    }

    #[test]
    fn mismatch_detail_serializes_both_addresses() {
        let report = SyncReport::Failed {
            status: OperationStatus::VerificationFailed,
            message: "initiator does not match the transaction sender".into(),
            mismatch: Some(SenderMismatch {
                expected: Address::from_bytes(&[1; 20]),
                actual: Address::from_bytes(&[2; 20]),
            }),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["mismatch"]["expected"].is_string());
        assert!(json["mismatch"]["actual"].is_string());
    }
}
