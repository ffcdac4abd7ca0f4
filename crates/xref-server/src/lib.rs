//! HTTP API surface for xref.
//!
//! Thin pass-through handlers over the confirmation engine and the
//! cross-reference registry. Every terminal engine state maps to exactly
//! one response shape: partial successes answer 200 with a `warning`,
//! failures answer 4xx/5xx with `success: false`.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{ConfirmationSettings, LedgerEndpoint, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use router::{build_router, AppState};
pub use server::XrefServer;
