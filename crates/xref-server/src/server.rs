use std::sync::Arc;

use tokio::net::TcpListener;

use xref_client::{ContractHandle, HttpLedgerClient, LedgerClient, Signer};
use xref_engine::ConfirmationEngine;
use xref_registry::Registry;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::router::{build_router, AppState};

/// The xref API server.
pub struct XrefServer {
    config: ServerConfig,
    state: AppState,
}

impl XrefServer {
    /// Wire both ledger connections, the registry, and the engine from
    /// configuration. Each connection gets its own signer capability.
    pub fn from_config(config: ServerConfig) -> ServerResult<Self> {
        let private_signer = Arc::new(Signer::from_hex(&config.private.signing_key)?);
        let public_signer = Arc::new(Signer::from_hex(&config.public.signing_key)?);

        let private: Arc<dyn LedgerClient> = Arc::new(HttpLedgerClient::new(
            &config.private.rpc_url,
            private_signer,
        ));
        let public: Arc<dyn LedgerClient> =
            Arc::new(HttpLedgerClient::new(&config.public.rpc_url, public_signer));

        let catalog = ContractHandle::new(config.private.contract.clone(), private);
        let registry = Registry::new(config.public.contract.clone(), public);
        let engine = Arc::new(ConfirmationEngine::new(
            catalog,
            registry.clone(),
            config.confirmation.engine_config(),
        ));

        Ok(Self {
            state: AppState::new(engine, registry),
            config,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = build_router(self.state);
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("xref server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| crate::error::ServerError::Internal(e.to_string()))
    }
}
