use anyhow::{Context, Result};
use parley_config::RelayConfig;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

/// Command-line overrides for the relay listener
#[derive(Debug, Default)]
pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<PathBuf>,
}

impl ServeOptions {
    pub fn apply(self, config: &mut RelayConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = self.static_dir {
            config.static_dir = Some(dir);
        }
    }
}

pub async fn execute(mut config: RelayConfig, options: ServeOptions) -> Result<()> {
    options.apply(&mut config);
    config
        .validate()
        .context("Relay configuration is incomplete")?;

    parley_web::start_server(&config, shutdown_signal())
        .await
        .context("Relay server failed")?;
    Ok(())
}

async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await
}

/// Resolve once `signal` fires; a broken signal listener never resolves
async fn wait_for_signal(signal: impl Future<Output = io::Result<()>>) {
    match signal.await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C, serving until killed: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
