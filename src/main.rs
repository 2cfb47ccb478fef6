use adaptivehash::config::ServerConfig;
use adaptivehash::hasher::AdaptiveHasher;
use adaptivehash::routes;
use adaptivehash::state::{AppState, State};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::event;
use tracing::Level;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let debug: bool = env::var("DEBUG").unwrap_or("true".to_string()) == "true";

    if debug {
        dotenv::from_filename("dev.env").ok();
    }

    tracing_subscriber::fmt()
        .with_max_level(if debug { Level::DEBUG } else { Level::INFO })
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            event!(Level::ERROR, error = format!("{e}"), "Invalid configuration.");
            return ExitCode::FAILURE;
        }
    };

    let hasher = match AdaptiveHasher::bcrypt(config.hasher.clone()) {
        Ok(hasher) => Arc::new(hasher),
        Err(e) => {
            event!(Level::ERROR, error = format!("{e}"), "Invalid hasher configuration.");
            return ExitCode::FAILURE;
        }
    };

    event!(Level::INFO, "Calibrating bcrypt cost...");
    let calibration = {
        let hasher = hasher.clone();
        tokio::task::spawn_blocking(move || hasher.calibrate()).await
    };

    match calibration {
        Ok(Ok(cost)) => event!(Level::INFO, cost, "Calibrated bcrypt cost."),
        Ok(Err(e)) => {
            event!(Level::ERROR, error = format!("{e}"), "Calibration failed.");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            event!(Level::ERROR, error = format!("{e}"), "Calibration task panicked.");
            return ExitCode::FAILURE;
        }
    }

    let bind_addr = config.bind_addr;
    let state: AppState = Arc::new(State { hasher, config });
    let app = routes::app(state);

    event!(Level::INFO, %bind_addr, "Starting server...");

    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            event!(Level::ERROR, error = format!("{e}"), "Could not bind.");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await
    {
        event!(Level::ERROR, error = format!("{e}"), "Server error.");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn shutdown() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    event!(Level::INFO, "Shutting down...");
}
