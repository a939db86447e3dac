use anyhow::{Context, Result};
use club_registry::{telemetry, RegistrationConfig, RegistrationServer};
use tokio::signal;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Variables already set in the environment win over `.env`.
    let dotenv = dotenvy::dotenv();

    let config = RegistrationConfig::from_env().context("Failed to read configuration from environment")?;

    telemetry::init_tracing(config.mode);
    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }

    let server = RegistrationServer::new(config)
        .await
        .context("Failed to start registration server")?;
    info!("Accepting registrations at {}", server.url());

    signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down");

    Ok(())
}
