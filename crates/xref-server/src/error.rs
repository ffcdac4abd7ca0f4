use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use xref_engine::EngineError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("registry error: {0}")]
    Registry(#[from] xref_registry::RegistryError),

    #[error("client error: {0}")]
    Client(#[from] xref_client::ClientError),

    #[error("invalid request: {0}")]
    Types(#[from] xref_types::TypeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Engine(EngineError::OwnershipDenied(_)) => StatusCode::FORBIDDEN,
            Self::Engine(EngineError::UnknownItem { .. }) => StatusCode::NOT_FOUND,
            Self::Engine(EngineError::InvalidRating(_)) => StatusCode::BAD_REQUEST,
            Self::Types(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "success": false,
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
