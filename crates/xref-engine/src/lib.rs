//! Dual-ledger confirmation engine.
//!
//! Catalog operations land on the low-latency private ledger first; a
//! cross-reference record mirrors each one onto the slower public ledger.
//! This crate orchestrates the protocol between the two: reserve a
//! placeholder record, verify the private transaction under bounded
//! retries, then race the placeholder patch against a fixed timer — and
//! produce a well-defined, possibly partial, [`SyncReport`] under every
//! failure combination.
//!
//! The private-ledger effect is the authoritative state change. Once it is
//! verified, nothing on the public side can fail the operation: public
//! errors downgrade to warnings in an otherwise successful report.

pub mod decoder;
pub mod engine;
pub mod error;
pub mod report;

pub use decoder::{
    event_signature_hash, DecodeError, EventDecoder, EventPresence, EventRecord,
    ITEM_ADDED_EVENT, ITEM_EDITED_EVENT,
};
pub use engine::{
    ConfirmRequest, ConfirmationEngine, EngineConfig, ItemDraft, PrepareAction, PreparedCall,
};
pub use error::{EngineError, EngineResult};
pub use report::{PublicReceiptInfo, RecordAnchor, SenderMismatch, SyncReport, VerifiedEffect};
