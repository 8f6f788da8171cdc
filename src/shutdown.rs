//! Process shutdown signal.

use tokio_util::sync::CancellationToken;

/// Cancel a token on SIGINT or SIGTERM.
///
/// The worker loop checks the token between cycles, so an in-progress job
/// is still completed and reported before the process exits.
pub fn install_shutdown_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        wait_for_signal().await;
        token_clone.cancel();
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Failed to install SIGTERM handler: {}", e);
            ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, finishing current cycle");
        }
        _ = ctrl_c() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received SIGINT, finishing current cycle"),
        Err(e) => {
            tracing::warn!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
