//! Cancels a retrieval when the process is asked to stop.
//!
//! See: [`cancel_on_signal`]

#![cfg(feature = "shutdown")]

use std::io;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// The exit code of a process ended by a second Ctrl + C.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Spawns a task that cancels `token` on Ctrl + C.
///
/// A second Ctrl + C ends the process with [`INTERRUPTED_EXIT_CODE`] without waiting for the
/// retrieval to stop. Must be called from within a tokio runtime.
pub fn cancel_on_signal(token: CancellationToken) {
    tokio::spawn(async move {
        if watch_signals(signal::ctrl_c, &token).await == Shutdown::Forced {
            error!("received Ctrl + C again, exiting now!");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
}

/// How watching for signals ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shutdown {
    /// The token was cancelled elsewhere before any signal arrived.
    Graceful,
    /// A signal arrived after the token was already cancelled.
    Forced,
    /// Signals cannot be received.
    Unavailable,
}

/// Cancels `token` on the first signal, then waits for a second one.
///
/// Returns [`Shutdown::Graceful`] if `token` is cancelled by someone else first.
async fn watch_signals<F, Fut>(mut next_signal: F, token: &CancellationToken) -> Shutdown
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = io::Result<()>> + Send,
{
    tokio::select! {
        result = next_signal() => {
            if let Err(err) = result {
                error!("failed to install Ctrl + C signal handler: {err}");
                return Shutdown::Unavailable;
            }
            warn!("received Ctrl + C, cancelling… (press Ctrl + C again to exit now)");
            token.cancel();
        }
        _ = token.cancelled() => return Shutdown::Graceful,
    }

    match next_signal().await {
        Ok(()) => Shutdown::Forced,
        Err(err) => {
            error!("failed to install Ctrl + C signal handler: {err}");
            Shutdown::Unavailable
        }
    }
}
