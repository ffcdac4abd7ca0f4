use thiserror::Error;

use xref_types::SubjectId;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("initiator is not the owner of item {0}")]
    OwnershipDenied(SubjectId),

    #[error("item {subject} not found: {message}")]
    UnknownItem { subject: SubjectId, message: String },

    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("decode error: {0}")]
    Decode(#[from] crate::decoder::DecodeError),

    #[error("client error: {0}")]
    Client(#[from] xref_client::ClientError),

    #[error("registry error: {0}")]
    Registry(#[from] xref_registry::RegistryError),

    #[error("type error: {0}")]
    Types(#[from] xref_types::TypeError),
}

pub type EngineResult<T> = Result<T, EngineError>;
