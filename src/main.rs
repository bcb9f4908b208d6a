use std::sync::Arc;

use log::{info, warn};

use crate::api::{create_router, cors_layer, AppState};
use crate::config::Config;
use crate::lastfm::LastfmClient;

mod api;
mod config;
mod lastfm;
mod logger;
mod now_playing;
#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    logger::init(config.log_level)?;

    if config.credentials().complete().is_none() {
        // Not fatal: each request reports the misconfiguration instead
        warn!("LASTFM_API_KEY or LASTFM_USERNAME is not set");
    }

    let client = LastfmClient::new(&config.lastfm_api_url, config.lastfm_timeout)?;
    let cors = match &config.cors_allow_origin {
        Some(origin) => Some(cors_layer(origin)?),
        None => None,
    };

    let state = AppState {
        client: Arc::new(client),
        credentials: Arc::new(config.credentials()),
    };
    let app = create_router(state, cors);

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Now playing server listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
