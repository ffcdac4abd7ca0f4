//! Cross-reference record store for xref.
//!
//! The public ledger hosts an append-only record table linking each private
//! transaction to a subject and an initiator. This crate is the typed
//! accessor over that table: reserving a record with the placeholder,
//! patching the placeholder with the verified private transaction id
//! (exactly once per record), and reading records back — including the
//! paginated per-subject history report.

pub mod error;
pub mod history;
pub mod record;
pub mod store;

pub use error::{RegistryError, RegistryResult};
pub use history::{build_history, HistoryEntry, HistoryReport, PageInfo, RecordClass};
pub use record::CrossRecord;
pub use store::{PatchReceipt, Registry, Reservation, SettlePolicy};
