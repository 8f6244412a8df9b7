//! Enhanced Calculator MCP Server
//!
//! Calculator, named-value store and feed search for AI agents.

use clap::Parser;
use enhanced_calc::mcp::http;
use enhanced_calc::{McpServer, ServerConfig, Transport};
use std::net::IpAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Enhanced Calculator MCP Server
#[derive(Parser, Debug)]
#[command(name = "calc-mcp")]
#[command(version)]
#[command(about = "MCP server for calculations, stored values and feed search")]
struct Args {
    /// Transport to serve on
    #[arg(short, long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Port to listen on (http transport)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (http transport)
    #[arg(short = 'H', long)]
    host: Option<IpAddr>,

    /// RSS/Atom feed searched by the feed tools
    #[arg(long)]
    feed_url: Option<String>,

    /// Number of calculations kept in history
    #[arg(long)]
    history_capacity: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the stdio protocol
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ServerConfig::from_env()?;
    config.transport = args.transport;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(feed_url) = args.feed_url {
        config.feed_url = feed_url;
    }
    if let Some(capacity) = args.history_capacity {
        config.history_capacity = capacity;
    }
    config.validate()?;

    let server = McpServer::from_config(&config)?;

    match config.transport {
        Transport::Stdio => {
            tracing::info!("Serving MCP over stdio");
            server.run().await?;
        }
        Transport::Http => {
            tracing::info!("Serving MCP over HTTP on {}", config.socket_addr());
            http::serve(Arc::new(server), config.socket_addr()).await?;
        }
    }

    Ok(())
}
