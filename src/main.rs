use tokio::net::TcpListener;

use voiceorder::{ServerConfig, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    let address = config.address();

    let app_state = AppState::from_config(config).await?;

    let app = routes::api::create_api_router()
        .merge(routes::ws::create_ws_router())
        .with_state(app_state);

    let listener = TcpListener::bind(&address).await?;
    tracing::info!("voiceorder listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
