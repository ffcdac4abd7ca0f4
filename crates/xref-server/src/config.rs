use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use xref_engine::EngineConfig;
use xref_types::Address;

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub private: LedgerEndpoint,
    pub public: LedgerEndpoint,
    #[serde(default)]
    pub confirmation: ConfirmationSettings,
}

/// One ledger connection: node endpoint, contract, and the process-held
/// signing key for that ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEndpoint {
    pub rpc_url: String,
    pub contract: Address,
    pub signing_key: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ConfirmationSettings {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub patch_timeout_ms: u64,
}

impl Default for ConfirmationSettings {
    fn default() -> Self {
        Self {
            max_retries: 10,
            retry_delay_ms: 2000,
            patch_timeout_ms: 30_000,
        }
    }
}

impl ConfirmationSettings {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            patch_timeout: Duration::from_millis(self.patch_timeout_ms),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            private: LedgerEndpoint {
                rpc_url: "http://127.0.0.1:8545".into(),
                contract: Address::from_bytes(&[1; 20]),
                signing_key: "00".repeat(32),
            },
            public: LedgerEndpoint {
                rpc_url: "http://127.0.0.1:8546".into(),
                contract: Address::from_bytes(&[2; 20]),
                signing_key: "00".repeat(32),
            },
            confirmation: ConfirmationSettings::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| ServerError::Config(e.to_string()))
    }
}
