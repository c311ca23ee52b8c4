//! The homepage server binary.
//!
//! Configuration is read from the environment (and a `.env` file, if present), see
//! [`AppConfig::from_env`].
use homepage::config::AppConfig;
use salvo::prelude::*;
use salvo::server::ServerHandle;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), homepage::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let service = homepage::service(&config)?;

    tracing::info!(
        environment = %config.environment,
        web_root = %config.web_root.display(),
        "listening on http://{}",
        config.listen_addr
    );
    let acceptor = TcpListener::new(config.listen_addr).bind().await;
    let server = Server::new(acceptor);
    tokio::spawn(listen_shutdown_signal(server.handle()));
    server.serve(service).await;
    Ok(())
}

async fn listen_shutdown_signal(handle: ServerHandle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("ctrl_c signal received"),
        _ = terminate => tracing::info!("terminate signal received"),
    };

    handle.stop_graceful(None);
}
