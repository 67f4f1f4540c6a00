use std::sync::Arc;

use carrier_registry::{
    build_app, config::Config, directory::CarrierDirectory, logging,
    response_log::FileResponseLog, AppState,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;
    let directory = CarrierDirectory::load(&config.carriers_path)?;
    info!(
        carriers = directory.len(),
        path = %config.carriers_path.display(),
        "carrier directory loaded"
    );

    let responses = FileResponseLog::new(config.responses_path.clone());
    if let Err(err) = responses.initialize().await {
        warn!(
            path = %config.responses_path.display(),
            error = %err,
            "could not initialize response log"
        );
    }

    let bind_socket = config.bind_socket()?;
    let state = AppState::new(directory, Arc::new(responses));
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        "server starting"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
