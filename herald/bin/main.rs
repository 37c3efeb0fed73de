#![deny(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::must_use_candidate)]

#[cfg(not(any(target_os = "macos", unix)))]
compile_error!("Only macos and unix are currently supported");

use herald::{config::Config, http::AppState, logging, serve::ContactServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; deployments may provide the environment
    // directly.
    let _ = dotenvy::dotenv();

    logging::init();

    let config = Config::from_env()?;
    let state = AppState {
        channel: config.channel()?,
        profile: config.profile.clone(),
    };

    let server = ContactServer::bind(&config, state).await?;
    server.serve().await?;

    Ok(())
}
