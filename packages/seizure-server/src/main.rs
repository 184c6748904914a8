use clap::Parser;
use seizure_server::{
    cli::{predict, ranges, Cli, Commands},
    config::ServerConfig,
    create_router,
    state::ServerState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so `ranges` output stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seizure_server=info,seizure_rs=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // `ranges` reads nothing from the environment
    let config = match cli.command {
        Some(Commands::Ranges { files }) => {
            let summary = ranges(&files)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }
        Some(Commands::Predict(args)) => {
            let config = ServerConfig::from_env()?;
            let output = tokio::task::spawn_blocking(move || predict(&config, &args)).await??;
            println!("{}", output.display());
            return Ok(());
        }
        Some(Commands::Serve) | None => ServerConfig::from_env()?,
    };

    info!("Starting Seizure Predict backend v{}", VERSION);
    info!("Configuration loaded:");
    info!("   Bind address: {}", config.bind_address());
    info!("   Model: {} ({:?})", config.model_type, config.model_path);
    info!("   Decision threshold: {}", config.decision_threshold);
    info!("   Inference batch size: {}", config.inference_batch_size);
    info!("   Max upload size: {} bytes", config.max_upload_size);
    info!("   CORS origins: {:?}", config.cors_origins);

    let state = Arc::new(ServerState::new(config));
    let addr: SocketAddr = state.config.bind_address().parse()?;
    let app = create_router(state);

    info!("Listening on http://{}", addr);
    info!("Health endpoint: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
