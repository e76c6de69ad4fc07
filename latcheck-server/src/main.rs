use clap::Parser;
use latcheck_server::config::{DEFAULT_ADDRESS, DEFAULT_TELEMETRY_PATH};
use latcheck_server::telemetry::TelemetrySet;
use latcheck_server::{Server, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "latcheck-server")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = DEFAULT_ADDRESS)]
    address: SocketAddr,

    /// Path to a JSON array of telemetry records. Falls back to a built-in
    /// sample when the file is missing or unreadable.
    #[arg(long, default_value = DEFAULT_TELEMETRY_PATH)]
    telemetry: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = ServerConfig {
        address: args.address,
        telemetry: TelemetrySet::load_or_fallback(&args.telemetry),
    };

    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();

    // Print "Listening on <addr>" once the server signals it is bound.
    tokio::spawn(async move {
        if let Ok(addr) = ready_rx.await {
            println!("Listening on {}", addr);
        }
    });

    Server::new(config).run(ready_tx).await?;
    Ok(())
}
