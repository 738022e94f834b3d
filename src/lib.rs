pub mod cli;
pub mod config;
pub mod console;
pub mod gateway;
pub mod location;
pub mod media;
pub mod models;
pub mod persona;
pub mod session;

use cli::Args;
use config::AppConfig;
use console::Console;
use gateway::{ Gateway, HttpGateway };
use location::{ FixedLocation, LocationProvider, NoLocation };
use log::info;
use media::MediaAcquisition;
use session::Session;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::from_args(&args)?;

    info!("--- Core Configuration ---");
    match &config.gateway {
        Some(gateway) => {
            info!("Backend: {}", gateway.base_url);
            info!("Chat Route: {}", gateway.endpoints.chat);
            info!("Request Timeout: {:?}", gateway.request_timeout);
        }
        None => info!("Backend: disabled (offline mode)"),
    }
    info!("Camera: {:?}", config.camera);
    info!("Location Shared: {}", config.position.is_some());
    info!("Device UID: {}", config.session.uid);
    info!(
        "Thinking Window: {:?}..{:?}",
        config.session.thinking_min,
        config.session.thinking_max
    );
    info!("-------------------------");

    let gateway = match config.gateway.clone() {
        Some(gateway_config) => {
            let remote = Arc::new(HttpGateway::new(gateway_config, config.session.uid.clone())?);
            Gateway::initialize(remote).await
        }
        None => Gateway::offline(),
    };

    let location: Arc<dyn LocationProvider> = match config.position {
        Some(position) => Arc::new(FixedLocation(position)),
        None => Arc::new(NoLocation),
    };

    let media = MediaAcquisition::new(config.camera.into_device());
    let session = Session::new(config.session, media, gateway, location);
    Console::new(session).run().await
}
