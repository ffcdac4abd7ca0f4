use thiserror::Error;

use xref_client::Receipt;
use xref_types::Address;

/// Event emitted by the catalog contract when an item is added.
pub const ITEM_ADDED_EVENT: &str = "ItemAdded(uint256,address)";

/// Event emitted by the catalog contract when an item is edited.
pub const ITEM_EDITED_EVENT: &str = "ItemEdited(uint256,address)";

/// Hash of an event signature, as it appears in a log's first topic.
pub fn event_signature_hash(signature: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"xref-event-v1:");
    hasher.update(signature.as_bytes());
    format!("0x{}", hex::encode(hasher.finalize().as_bytes()))
}

/// What a receipt's logs say about an expected event.
///
/// `EventAbsent` and `NoContractLogs` are distinct on purpose: the first
/// means the transaction succeeded but emitted a different event, the
/// second that nothing in the receipt came from our contract at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventPresence {
    Found(EventRecord),
    EventAbsent,
    NoContractLogs,
}

/// Sender and block metadata extracted once the expected event is present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRecord {
    pub sender: Address,
    pub block_number: u64,
    pub gas_used: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed receipt: {0}")]
    MalformedReceipt(String),
}

/// Decodes receipts from the private ledger against an expected event.
pub struct EventDecoder {
    contract: Address,
}

impl EventDecoder {
    pub fn new(contract: Address) -> Self {
        Self { contract }
    }

    /// Look for `signature` among the receipt's logs from our contract.
    pub fn decode(&self, receipt: &Receipt, signature: &str) -> Result<EventPresence, DecodeError> {
        let expected_topic = event_signature_hash(signature);

        let mut saw_contract_log = false;
        for log in receipt.logs.iter().filter(|l| l.address == self.contract) {
            saw_contract_log = true;
            let topic = log.topics.first().ok_or_else(|| {
                DecodeError::MalformedReceipt("contract log carries no topics".into())
            })?;
            if topic.eq_ignore_ascii_case(&expected_topic) {
                return Ok(EventPresence::Found(EventRecord {
                    sender: receipt.from.clone(),
                    block_number: receipt.block_number,
                    gas_used: receipt.gas_used,
                }));
            }
        }

        if saw_contract_log {
            Ok(EventPresence::EventAbsent)
        } else {
            Ok(EventPresence::NoContractLogs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use xref_client::LogEntry;
    use xref_types::TxId;

    fn addr(byte: u8) -> Address {
        Address::from_bytes(&[byte; 20])
    }

    fn receipt_with_logs(logs: Vec<LogEntry>) -> Receipt {
        let mut r = Receipt::success(TxId::from_bytes(&[1; 32]), addr(9)).at_block(5);
        r.gas_used = 40_000;
        r.logs = logs;
        r
    }

    fn log(contract: u8, topic: &str) -> LogEntry {
        LogEntry {
            address: addr(contract),
            topics: vec![topic.to_string()],
            data: Value::Null,
        }
    }

    #[test]
    fn signature_hash_is_deterministic_and_distinct() {
        assert_eq!(
            event_signature_hash(ITEM_ADDED_EVENT),
            event_signature_hash(ITEM_ADDED_EVENT)
        );
        assert_ne!(
            event_signature_hash(ITEM_ADDED_EVENT),
            event_signature_hash(ITEM_EDITED_EVENT)
        );
    }

    #[test]
    fn finds_expected_event_and_extracts_metadata() {
        let decoder = EventDecoder::new(addr(2));
        let receipt = receipt_with_logs(vec![log(2, &event_signature_hash(ITEM_ADDED_EVENT))]);

        let presence = decoder.decode(&receipt, ITEM_ADDED_EVENT).unwrap();
        match presence {
            EventPresence::Found(event) => {
                assert_eq!(event.sender, addr(9));
                assert_eq!(event.block_number, 5);
                assert_eq!(event.gas_used, 40_000);
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn topic_match_ignores_hex_case() {
        let decoder = EventDecoder::new(addr(2));
        let topic = event_signature_hash(ITEM_ADDED_EVENT).to_uppercase().replace("0X", "0x");
        let receipt = receipt_with_logs(vec![log(2, &topic)]);
        assert!(matches!(
            decoder.decode(&receipt, ITEM_ADDED_EVENT).unwrap(),
            EventPresence::Found(_)
        ));
    }

    #[test]
    fn different_event_from_our_contract_is_absent() {
        let decoder = EventDecoder::new(addr(2));
        let receipt = receipt_with_logs(vec![log(2, &event_signature_hash(ITEM_EDITED_EVENT))]);
        assert_eq!(
            decoder.decode(&receipt, ITEM_ADDED_EVENT).unwrap(),
            EventPresence::EventAbsent
        );
    }

    #[test]
    fn logs_from_other_contracts_do_not_count() {
        let decoder = EventDecoder::new(addr(2));
        let receipt = receipt_with_logs(vec![log(3, &event_signature_hash(ITEM_ADDED_EVENT))]);
        assert_eq!(
            decoder.decode(&receipt, ITEM_ADDED_EVENT).unwrap(),
            EventPresence::NoContractLogs
        );
    }

    #[test]
    fn no_logs_at_all_is_no_contract_logs() {
        let decoder = EventDecoder::new(addr(2));
        let receipt = receipt_with_logs(vec![]);
        assert_eq!(
            decoder.decode(&receipt, ITEM_ADDED_EVENT).unwrap(),
            EventPresence::NoContractLogs
        );
    }

    #[test]
    fn contract_log_without_topics_is_malformed() {
        let decoder = EventDecoder::new(addr(2));
        let receipt = receipt_with_logs(vec![LogEntry {
            address: addr(2),
            topics: vec![],
            data: Value::Null,
        }]);
        assert!(matches!(
            decoder.decode(&receipt, ITEM_ADDED_EVENT),
            Err(DecodeError::MalformedReceipt(_))
        ));
    }
}
