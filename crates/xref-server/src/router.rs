use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use xref_client::LedgerClient;
use xref_engine::ConfirmationEngine;
use xref_registry::Registry;

use crate::handler;

/// Shared handler state: the engine and the registry it writes through.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConfirmationEngine<dyn LedgerClient, dyn LedgerClient>>,
    pub registry: Registry<dyn LedgerClient>,
}

impl AppState {
    pub fn new(
        engine: Arc<ConfirmationEngine<dyn LedgerClient, dyn LedgerClient>>,
        registry: Registry<dyn LedgerClient>,
    ) -> Self {
        Self { engine, registry }
    }
}

/// Build the axum router with all xref endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health))
        .route("/v1/items/prepare-add", post(handler::prepare_add))
        .route("/v1/items/confirm-add", post(handler::confirm_add))
        .route("/v1/items/:id/prepare-edit", post(handler::prepare_edit))
        .route("/v1/items/confirm-edit", post(handler::confirm_edit))
        .route("/v1/items/:id/prepare-rate", post(handler::prepare_rate))
        .route("/v1/items/:id/prepare-like", post(handler::prepare_like))
        .route(
            "/v1/items/:id/prepare-comment",
            post(handler::prepare_comment),
        )
        .route("/v1/items/:id/history", get(handler::item_history))
        .route("/v1/records", get(handler::list_records))
        .route("/v1/records/count", get(handler::record_count))
        .route("/v1/records/:id", get(handler::get_record))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
