mod auth;
mod config;
mod images;
mod model;
mod normalizer;
mod search;
mod server;
mod storage;
mod utils;

use actix_web::web;
use auth::AdminAuth;
use config::{AppConfig, load_config};
use images::ImageStore;
use storage::SqliteStorage;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[actix_web::main]
async fn main() {
    // Initialize logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic occurred: {}", panic_info);
    }));

    // Load configuration from file
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config: AppConfig = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };

    if config.admin_password_hash.trim().is_empty() {
        warn!("admin_password_hash is not set; admin logins will be refused");
    }

    // Initialize storage (SQLite), shared behind an async Mutex
    let storage = match SqliteStorage::new(&config.database_path) {
        Ok(s) => web::Data::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            return;
        }
    };

    // Make sure uploaded photos have somewhere to go
    let images = ImageStore::new(&config.upload_path, config.image_max_dimension, config.image_quality);
    if let Err(e) = images.ensure_dir() {
        error!("Failed to prepare upload directory {}: {}", config.upload_path, e);
        return;
    }
    info!("Serving images from {}", images.root().display());

    let auth = web::Data::new(AdminAuth::from_config(&config));

    info!("Starting auto-dealer backend...");
    if let Err(e) = server::run(&config.bind_address, storage, auth, web::Data::new(images)).await {
        error!("Server error: {}", e);
    }
    info!("Server stopped.");
}
