use thiserror::Error;

use xref_types::RecordId;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The record no longer carries the placeholder; a second patch is
    /// refused before it reaches the ledger.
    #[error("record {0} already patched")]
    AlreadyPatched(RecordId),

    #[error("reservation reverted on the public ledger")]
    ReservationReverted,

    #[error("patch reverted on the public ledger")]
    PatchReverted,

    /// A submission settled nowhere within the polling budget. The message
    /// intentionally contains "timeout": callers classify congestion by
    /// substring match on the underlying error text.
    #[error("timeout waiting for {what} to settle after {polls} polls")]
    SettleTimeout { what: String, polls: u32 },

    #[error("malformed record payload: {0}")]
    MalformedRecord(String),

    #[error("client error: {0}")]
    Client(#[from] xref_client::ClientError),

    #[error("type error: {0}")]
    Types(#[from] xref_types::TypeError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
