//! A framework that repeats a remote call until it succeeds, fails permanently, or the retry limit is reached.

mod state;

pub use state::*;

use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::error::{Error, Result};

/// Runs `f` until it returns a value or a non-transient error, retrying transient errors at most `max_retries` times.
///
/// # Errors
///
/// Returns the last error once retrying is no longer allowed.
pub async fn run_with_retries<F, Fut, T>(max_retries: u8, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Result<T>> + Send,
    T: Send,
{
    let mut retry: u8 = 0;

    loop {
        match State::from(f().await) {
            State::Success(value) => return Ok(value),
            State::Retry(err) => {
                if retry_if_possible(&mut retry, max_retries).is_err() {
                    return Err(err);
                }
            }
            State::Stop(err) => {
                error!("giving up: {err}");
                return Err(err);
            }
        }
    }
}

/// Runs `f` unless `cancel` fires first. A token that is already cancelled never polls `f`.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] once `cancel` fires, otherwise the error of `f`.
pub async fn until_cancelled<Fut, T>(cancel: &CancellationToken, f: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>> + Send,
    T: Send,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!("cancelled, stopping…");
            Err(Error::Cancelled)
        }
        result = f => result,
    }
}
