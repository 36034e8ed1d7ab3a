use anyhow::Result;
use tokio_util::sync::CancellationToken;

/// Resolve once the process is asked to stop (Ctrl+C or SIGTERM).
pub async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
            _ = tokio::signal::ctrl_c() => {},
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}

/// Token cancelled on the first shutdown signal.
///
/// The waiter runs on its own task; cancelling the token from elsewhere
/// (tests, a `check` run) ends it as well.
pub fn cancel_on_signal() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            res = wait_for_shutdown() => {
                if let Err(e) = res {
                    tracing::warn!(error = %e, "shutdown: signal listener failed");
                }
                tracing::info!("shutdown: signal received");
                child.cancel();
            }
            _ = child.cancelled() => {}
        }
    });
    token
}
