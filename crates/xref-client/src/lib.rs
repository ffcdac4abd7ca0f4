//! Ledger client abstraction for xref.
//!
//! A [`LedgerClient`] wraps one JSON-RPC connection to one ledger. Two
//! instances exist at runtime — the low-latency private ledger that is the
//! source of truth for catalog operations, and the public ledger hosting
//! the cross-reference audit trail. The type is the same for both; the role
//! is configuration.
//!
//! Contract state is consumed through exactly two primitive operations,
//! exposed on [`ContractHandle`]: `view` (read, never mutates) and `send`
//! (stateful, returns a transaction id). Transactions are signed with the
//! process-held [`Signer`] capability injected at construction.

pub mod contract;
pub mod error;
pub mod memory;
pub mod rpc;
pub mod signer;
pub mod traits;
pub mod types;

pub use contract::ContractHandle;
pub use error::{ClientError, ClientResult};
pub use memory::{InMemoryLedger, StagedSettle};
pub use rpc::HttpLedgerClient;
pub use signer::Signer;
pub use traits::LedgerClient;
pub use types::{CallData, LogEntry, Receipt, ReceiptStatus, TxPayload, ViewCall};
