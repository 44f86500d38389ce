use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use line_echo::{Limits, Listener};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "line-echo-server", about = "A concurrent line-echo server")]
struct Args {
    /// Port to listen on
    port: u16,

    /// Largest line accepted before the session is dropped, in bytes
    #[arg(long, default_value_t = 8192)]
    max_line_bytes: usize,

    /// Seconds a session may sit idle before it is dropped
    #[arg(long, default_value_t = 300)]
    idle_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // connect tracing to stdout, filtered through RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let limits = Limits {
        max_line_bytes: args.max_line_bytes,
        idle_timeout: Duration::from_secs(args.idle_timeout_secs),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = Listener::bind(addr, limits).await?;
    tracing::info!("listening on: {}", listener.local_addr()?);

    // stop accepting on ctrl-c; in-flight sessions run until their peers hang up
    tokio::select! {
        _ = listener.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down, no longer accepting connections");
        }
    };

    Ok(())
}
