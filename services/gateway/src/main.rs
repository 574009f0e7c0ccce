mod auth;
mod config;
mod error;
mod extract;
mod handlers;
mod models;
mod router;
mod state;

use config::GatewayConfig;
use router::create_router;
use state::AppState;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting supply chain gateway");

    let config = GatewayConfig::from_env()?;
    let state = AppState::from_config(&config)?;
    let owner = state.read(|chain| chain.owner())?;
    tracing::info!(
        %owner,
        persistence = config.state_path.is_some(),
        "Contract ready"
    );

    let app = create_router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
