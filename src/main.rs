use dotenvy::dotenv;
use tokio::{ net::TcpListener, signal };
use tracing::{ error, info };

use attendance_gateway::{ config::logging::init_logging, initialize_app };

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let (app, state) = match initialize_app() {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let addr = state.config.gateway.bind_addr;
    info!("Forwarding to attendance service at {}", state.upstream.base_url());

    let listener = TcpListener::bind(addr).await?;
    info!("Gateway running on http://{}", addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Gateway shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
