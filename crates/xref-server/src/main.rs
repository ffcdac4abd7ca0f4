use anyhow::Context;
use tracing_subscriber::EnvFilter;

use xref_server::{ServerConfig, XrefServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1).or_else(|| std::env::var("XREF_CONFIG").ok()) {
        Some(path) => ServerConfig::from_toml_file(&path)
            .with_context(|| format!("loading config from {path}"))?,
        None => {
            tracing::warn!("no config given, using defaults");
            ServerConfig::default()
        }
    };

    let server = XrefServer::from_config(config).context("wiring ledger connections")?;
    server.serve().await.context("serving")?;
    Ok(())
}
