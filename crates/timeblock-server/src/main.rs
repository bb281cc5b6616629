//! timeblock daemon entry point.
//!
//! Starts the socket server in the foreground and blocks until a
//! shutdown signal (SIGTERM/SIGINT) or a client shutdown request.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use timeblock_core::{TracingConfig, init_tracing};
use timeblock_providers::{EnrichmentGateway, NagerHolidaySource, SevenTimerWeatherSource};
use timeblock_server::{
    ServerConfig, ServerResult, SignalHandler, SocketServer, make_connection_handler,
    new_shared_state,
};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing(TracingConfig::daemon()) {
        eprintln!("error: failed to initialize tracing: {}", e);
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ServerResult<()> {
    let config = ServerConfig::default();

    // Enrichment sources degrade to empty metadata when unreachable, so
    // a failed client build is the only hard startup error here.
    let holidays = NagerHolidaySource::new(config.enrichment_timeout)
        .map_err(|e| timeblock_server::ServerError::config(e.to_string()))?;
    let weather = SevenTimerWeatherSource::new(config.enrichment_timeout)
        .map_err(|e| timeblock_server::ServerError::config(e.to_string()))?;

    let gateway = Arc::new(
        EnrichmentGateway::new(Arc::new(holidays), Arc::new(weather))
            .with_lookup_timeout(config.enrichment_timeout)
            .with_country(config.holiday_country.clone()),
    );

    let signal_handler = SignalHandler::new();
    signal_handler.spawn_listener()?;

    let state = new_shared_state();
    {
        // A client shutdown request stops the accept loop through the
        // same channel as SIGTERM.
        let mut s = state.write().await;
        s.set_shutdown_handle(signal_handler.shutdown_handle());
    }

    let server = SocketServer::new(config.clone()).await?;
    info!(path = %server.socket_path().display(), "timeblock server started");

    let handler = make_connection_handler(state, gateway, config.forecast_point);
    let shutdown = signal_handler.shutdown();
    server.run_until_shutdown(handler, shutdown.wait()).await?;

    info!("timeblock server stopped");
    Ok(())
}
