use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The node rejected a stateful submission (network error, malformed
    /// payload, insufficient funds). The message is surfaced verbatim.
    #[error("submission rejected: {0}")]
    Submission(String),

    /// Network-level failure before a response arrived. Retryable.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node answered, but not with anything we can use.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid signing key: {0}")]
    Key(String),

    #[error("client configuration error: {0}")]
    Config(String),

    #[error("type error: {0}")]
    Types(#[from] xref_types::TypeError),
}

pub type ClientResult<T> = Result<T, ClientError>;
