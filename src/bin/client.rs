use anyhow::Context;
use clap::Parser;
use line_echo::relay;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "line-echo-client", about = "Interactive client for the line-echo server")]
struct Args {
    /// Host to connect to
    host: String,

    /// Port the server is listening on
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let stream = relay::connect(&args.host, args.port).await?;

    let console = BufReader::new(tokio::io::stdin());
    relay::relay(console, stream, tokio::io::stdout())
        .await
        .context("lost the connection to the server")?;

    Ok(())
}
