use anyhow::Result;
use clap::Parser;
use dream_oracle::app::App;
use dream_oracle::models::Config;
use dream_oracle::server;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "dream-oracle")]
#[command(about = "Serve dream interpretations and lucky numbers")]
struct CliArgs {
    /// Address to listen on, overriding BIND_ADDR.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dream_oracle=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting dream-oracle");

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let bind_addr = args.bind.unwrap_or_else(|| config.bind_addr.clone());
    let app = Arc::new(App::from_config(&config));

    let listener = TcpListener::bind(bind_addr.as_str()).await.map_err(|e| {
        error!("Failed to bind {}: {}", bind_addr, e);
        e
    })?;

    server::serve(listener, app).await?;
    Ok(())
}
