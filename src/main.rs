//! review-gateway
//!
//! Front door for the code review API. Four independently owned services
//! sit behind one address:
//!
//! ```text
//!                         ┌──────────────────────────────┐
//!                         │        REVIEW GATEWAY        │
//!   Client Request        │  ┌────────┐   ┌───────────┐  │    ┌────────────┐
//!   ──────────────────────┼─▶│  http  │──▶│  routing  │──┼───▶│ auth       │ /api/auth
//!                         │  │ server │   │ dispatcher│──┼───▶│ repos      │ /api/repos
//!                         │  └────────┘   └─────┬─────┘──┼───▶│ reviews    │ /api/reviews
//!                         │                     │       ─┼───▶│ users      │ /api/users
//!                         │               no match: 404  │    └────────────┘
//!                         │                              │     static dir   /static
//!                         └──────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use review_gateway::config::{load_config, GatewayConfig};
use review_gateway::lifecycle;
use review_gateway::observability::init_logging;

#[derive(Parser)]
#[command(name = "review-gateway")]
#[command(about = "Prefix dispatcher for the code review API", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults are used if omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);

    tracing::info!("review-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_in_flight = config.listener.max_in_flight,
        request_timeout_secs = config.timeouts.request_secs,
        mounts = config.mounts.len(),
        "Configuration loaded"
    );

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
