use std::net::SocketAddr;

use anyhow::Result;
use cairn::{Config, ParseServer};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "cairn-server",
    about = "Expose pipeline structure analysis over HTTP"
)]
struct Args {
    /// HTTP address to bind, e.g. 127.0.0.1:24130
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args { addr } = Args::parse();
    tracing_subscriber::fmt::init();

    let mut config = Config::from_env()?;
    if let Some(addr) = addr {
        config.addr = addr;
    }

    let server = ParseServer::start(config).await?;
    tracing::info!(addr = %server.addr(), "cairn-server ready");

    tokio::signal::ctrl_c().await?;
    server.shutdown().await;
    Ok(())
}
