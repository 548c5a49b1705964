//! Keepsake REST API entry point.
//!
//! Binary name: `keepsake`
//!
//! Parses CLI arguments, wires the application state, and serves the HTTP
//! API. The generative backend key comes from the `GEMINI_API_KEY`
//! environment variable; the data directory from `--data-dir` or
//! `KEEPSAKE_DATA_DIR`.

mod http;
mod state;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use state::AppState;

#[derive(Debug, Parser)]
#[command(name = "keepsake", about = "Conversational memory-companion backend", version)]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value_t = 5001)]
    port: u16,

    /// Data directory override (defaults to KEEPSAKE_DATA_DIR or ~/.keepsake).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,keepsake=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let state = AppState::init(cli.data_dir).await?;
    let router = http::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cli.port)).await?;
    tracing::info!(port = cli.port, "chat server listening");
    axum::serve(listener, router).await?;

    Ok(())
}
