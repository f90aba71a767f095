use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use parley_cli::cli::{Cli, Commands};
use parley_cli::commands::{self, serve::ServeOptions};
use parley_config::RelayConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the CLI level
    let level = cli.level().to_string().to_lowercase();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "parley={level},parley_cli={level},parley_web={level},parley_assistant={level},parley_config={level},tower_http={level}"
        ))
    });
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = RelayConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            static_dir,
        } => {
            commands::serve::execute(
                config,
                ServeOptions {
                    host,
                    port,
                    static_dir,
                },
            )
            .await?
        }

        Commands::Chat { url } => {
            let url = url.unwrap_or_else(|| format!("http://{}", config.listen_addr()));
            commands::chat::execute(url).await?
        }
    }

    Ok(())
}
