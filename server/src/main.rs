use anyhow::Result;
use server::{
    config::ServerConfig,
    http::{self, AppState},
    storage::{EnvironmentStore, ObjectStoreBackend},
};
use std::sync::Arc;
use tracing::{Level, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    info!("Starting environment registry");

    let config = ServerConfig::from_env()?;
    info!("Using {} storage backend", config.storage.kind());

    let storage = ObjectStoreBackend::from_config(config.storage)?;
    let storage: Arc<dyn EnvironmentStore> = Arc::new(storage);

    http::start_server(AppState::new(storage), config.bind_address).await?;

    Ok(())
}
