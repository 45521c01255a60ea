use log::{info, error};
use std::process::ExitCode;
use std::sync::Arc;

mod core;
mod storage;
mod web;
mod utils;

use crate::core::settings::Settings;
use crate::storage::{Repository, SqliteRepository};
use crate::web::server::bind_web_server;

#[actix_web::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    info!("Starting Nuvelu backend...");

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let repository: Arc<dyn Repository> = match SqliteRepository::open(&settings.database_path) {
        Ok(repository) => Arc::new(repository),
        Err(e) => {
            error!("Failed to open database at {}: {}", settings.database_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let server = match bind_web_server(&settings, repository) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to bind {}:{}: {}", settings.bind_address, settings.port, e);
            return ExitCode::FAILURE;
        }
    };

    // Runs until SIGINT/SIGTERM, then drains connections; the repository
    // logs its disconnect once the last handle is dropped
    match server.await {
        Ok(()) => {
            info!("Nuvelu backend shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Web server failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
