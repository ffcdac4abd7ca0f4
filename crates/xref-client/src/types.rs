use serde::{Deserialize, Serialize};
use serde_json::Value;

use xref_types::{Address, TxId};

/// Mined outcome of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Success,
    Failure,
}

/// A single event log emitted during transaction execution.
///
/// The first topic identifies the event (hash of its signature); the rest
/// are indexed parameters. `data` carries the unindexed payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<String>,
    pub data: Value,
}

/// The mined outcome of a submitted transaction.
///
/// `output` is the contract return value the node surfaces for stateful
/// calls; reservation ids are read from here rather than from any count
/// observed before submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_id: TxId,
    pub status: ReceiptStatus,
    pub from: Address,
    pub block_number: u64,
    pub gas_used: u64,
    pub logs: Vec<LogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl Receipt {
    /// A minimal successful receipt, mostly for tests and demos.
    pub fn success(tx_id: TxId, from: Address) -> Self {
        Self {
            tx_id,
            status: ReceiptStatus::Success,
            from,
            block_number: 1,
            gas_used: 21_000,
            logs: Vec::new(),
            output: None,
        }
    }

    /// A minimal failed receipt.
    pub fn failure(tx_id: TxId, from: Address) -> Self {
        Self {
            status: ReceiptStatus::Failure,
            ..Self::success(tx_id, from)
        }
    }

    pub fn with_log(mut self, log: LogEntry) -> Self {
        self.logs.push(log);
        self
    }

    pub fn with_output(mut self, output: Value) -> Self {
        self.output = Some(output);
        self
    }

    pub fn at_block(mut self, block_number: u64) -> Self {
        self.block_number = block_number;
        self
    }
}

/// ABI-encoded call payload.
///
/// The encoding layer proper is an external collaborator; this wire form is
/// a 4-byte method selector followed by the canonical JSON of the argument
/// list, hex-encoded as one `0x` string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallData(String);

impl CallData {
    pub fn encode(method: &str, args: &[Value]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"xref-call-v1:");
        hasher.update(method.as_bytes());
        let hash = hasher.finalize();
        let selector = &hash.as_bytes()[..4];

        let body = serde_json::to_vec(args).unwrap_or_default();
        Self(format!("0x{}{}", hex::encode(selector), hex::encode(body)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A read-only contract call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewCall {
    pub contract: Address,
    pub method: String,
    pub args: Vec<Value>,
}

/// A stateful transaction ready for signing and submission.
///
/// Gas, gas price, and nonce may be left to the node; the cross-reference
/// patch path fills them explicitly. `from` overrides the process signer's
/// address for test-harness wallet flows only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxPayload {
    pub to: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub data: CallData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

impl TxPayload {
    /// A payload that leaves gas management to the node.
    pub fn call(to: Address, data: CallData) -> Self {
        Self {
            to,
            from: None,
            data,
            gas: None,
            gas_price: None,
            nonce: None,
        }
    }
}
