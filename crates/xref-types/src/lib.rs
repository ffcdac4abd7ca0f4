//! Foundation types for xref.
//!
//! This crate provides the identifier and lifecycle types shared by every
//! other xref crate. The system records catalog operations on a low-latency
//! private ledger and mirrors a cross-reference record onto a public ledger;
//! the types here name the participants of that protocol.
//!
//! # Key Types
//!
//! - [`Address`] — Actor address with case-insensitive equality
//! - [`TxId`] — Ledger transaction identifier, including the placeholder
//!   sentinel written into a record before the real id is known
//! - [`SubjectId`] — Domain entity (catalog item) identifier
//! - [`RecordId`] — Public-ledger cross-reference record index
//! - [`Operation`] / [`OperationStatus`] — Confirmation lifecycle with a
//!   monotonic transition order

pub mod address;
pub mod error;
pub mod operation;
pub mod record;
pub mod tx;

pub use address::Address;
pub use error::TypeError;
pub use operation::{Operation, OperationKind, OperationStatus};
pub use record::{RecordId, SubjectId};
pub use tx::TxId;
