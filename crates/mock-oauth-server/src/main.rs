//! Mock OAuth Server - Entry Point

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mock_oauth_server::{config::Config, server::MockOAuthServer};

#[derive(Parser, Debug)]
#[command(name = "mock-oauth-server")]
#[command(about = "Mock OAuth 2.0 / OpenID Connect provider with PKCE")]
#[command(version)]
struct Cli {
    /// Shared secret used to sign access and ID tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// HTTP server port
    #[arg(long, default_value = "3000", env = "PORT")]
    port: u16,

    /// Public base URL for the discovery document (e.g., https://idp.test)
    #[arg(long, env = "BASE_URL")]
    base_url: Option<String>,

    /// Seconds an unredeemed authorization code stays valid
    #[arg(long, default_value = "600", env = "CODE_TTL_SECS")]
    code_ttl_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cli.port,
        "Starting mock OAuth server"
    );

    let config = Config::new(cli.jwt_secret, cli.port, cli.base_url)?
        .with_code_ttl(Duration::from_secs(cli.code_ttl_secs));

    MockOAuthServer::new(config).run_http().await
}
