use std::sync::Arc;

use loyalty_adapters::{
    configure_instrumentation, shutdown_instrumentation, ApplicationStore, LoyaltyConfig,
};
use tokio::signal;
use tracing::{error, info};

use routes::AppState;

mod routes;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let _provider = configure_instrumentation()?;

    let config = LoyaltyConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);

        e
    })?;

    let loyalty_store = ApplicationStore::connect(&config.store).await?;

    let shared_state = Arc::new(AppState { loyalty_store });
    let app = routes::router(shared_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_instrumentation();

    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutting down");
        }
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
        }
    }
}
