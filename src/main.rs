use dotenv::dotenv;
use tracing::{info, warn};

use food_platform::app::app::App;
use food_platform::util::logger::Logger;

#[tokio::main]
async fn main() {
    let dotenv_result = dotenv();

    // Guards must outlive the server or buffered file logs are lost.
    let _logger = match Logger::new() {
        Ok(logger) => Some(logger),
        Err(e) => {
            eprintln!("Failed to initialise file logging: {}", e);
            None
        }
    };

    info!("Starting food platform backend");
    match dotenv_result {
        Ok(_) => info!("Loaded .env file"),
        Err(e) => warn!("Failed to load .env file: {} (using system env vars)", e),
    }

    let app = App::new().await;
    app.start().await;
}
