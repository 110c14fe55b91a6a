use anyhow::Result;
use clap::Parser;
use pendler::config::Config;
use pendler::server::{serve, AppState};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pendler",
    about = "Pendler — commute traffic aggregator",
    version
)]
struct Cli {
    /// Port for the HTTP API
    #[arg(long, default_value = "8000")]
    port: u16,

    /// Enable verbose/debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "pendler=debug"
    } else {
        "pendler=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let state = Arc::new(AppState::new(Config::from_env()));
    serve(state, cli.port).await
}
