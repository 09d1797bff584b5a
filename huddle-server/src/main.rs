use anyhow::Context;
use clap::Parser;
use huddle_core::IceServerConfig;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "huddle-server", about = "Signaling relay for full-mesh huddle calls")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// STUN server pushed to clients (repeatable).
    #[arg(
        long = "stun",
        default_values_t = [
            "stun:stun.l.google.com:19302".to_string(),
            "stun:global.stun.twilio.com:3478".to_string(),
        ]
    )]
    stun: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let ice_servers = vec![IceServerConfig {
        urls: args.stun,
        username: None,
        credential: None,
    }];

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    huddle_server::serve(listener, ice_servers).await
}
