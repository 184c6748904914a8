use clap::Parser;
use seizure_ui::{create_router, UiConfig, UiState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Seizure Predict UI - browser front end for the prediction backend
#[derive(Parser)]
#[command(name = "seizure-ui")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on (overrides UI_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Backend base URL (overrides BACKEND_URL)
    #[arg(short, long)]
    backend_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seizure_ui=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = UiConfig::from_env()?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(url) = cli.backend_url {
        config.backend_url = url.trim_end_matches('/').to_string();
    }

    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Starting Seizure Predict UI v{}", env!("CARGO_PKG_VERSION"));
    info!("   Backend: {}", config.backend_url);

    let state = Arc::new(UiState::new(config)?);
    let app = create_router(state);

    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
