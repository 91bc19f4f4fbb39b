use tokio::signal;
use tracing::{error, warn};

/// Resolve once Ctrl+C or SIGTERM arrives.
///
/// If a handler cannot be installed the failure is logged and that branch
/// never resolves, so the server keeps running until the other signal fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => warn!(signal = "SIGINT", "Initiating graceful shutdown"),
        () = terminate => warn!(signal = "SIGTERM", "Initiating graceful shutdown"),
    }
}
