use tracing::{error, info};

use authgate::{Config, Database, WebServer};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    // Load configuration; only a missing file falls back to defaults
    if !std::path::Path::new(CONFIG_PATH).exists() {
        eprintln!("{CONFIG_PATH} not found, using default configuration.");
    }
    let config = match Config::load_or_default(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            std::process::exit(1);
        }
    };

    // Initialize logging
    if let Err(e) = authgate::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        authgate::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("authgate {}", env!("CARGO_PKG_VERSION"));

    let db = match Database::open(&config.database.path, config.database.max_connections).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let server = match WebServer::new(&config, &db) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create web server: {}", e);
            std::process::exit(1);
        }
    };

    info!("Server configured on {}", server.addr());

    if let Err(e) = server.run().await {
        error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
