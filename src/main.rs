use log::*;
use service::logging::Logger;
use service::{AppState, Config};

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    let app_state = AppState::new(config);
    let server = web::start(app_state)
        .await
        .expect("Failed to start server");

    info!("Server running on http://{}", server.local_addr());

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
    info!("Shutdown signal received");

    if let Err(e) = server.stop().await {
        error!("Server exited with error: {e}");
    }
}
