//! portal-batch - batch execution server for the coaching portal

#![allow(missing_docs)]

use clap::Parser;
use portal_batch::config::{Config, DEFAULT_CONFIG_PATH};
use portal_batch::server;
use portal_batch::utils::logging::init_logging;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "portal-batch", version, about = "Batch execution server for the coaching portal")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "PORTAL_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

async fn load_config(cli: &Cli) -> portal_batch::Result<Config> {
    let mut config = if cli.config.exists() {
        Config::from_file(&cli.config).await?
    } else {
        eprintln!(
            "Configuration file {} not found, using defaults and environment",
            cli.config.display()
        );
        Config::from_env()?
    };

    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let result = async {
        let config = load_config(&cli).await?;
        init_logging(&config.logging)?;
        server::run_server(config).await
    }
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Print error using Display (not Debug) to preserve newlines
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
