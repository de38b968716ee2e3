use tracing::{error, warn};

use crate::error::{Error, Result};

/// A state that controls the flow of a repeated call.
#[non_exhaustive]
#[derive(Debug)]
pub enum State<T> {
    /// The call produced a value.
    Success(T),
    /// The call failed transiently and may be retried.
    ///
    /// See: [retry_if_possible]
    Retry(Error),
    /// The call failed and must not be retried.
    Stop(Error),
}

impl<T> From<Result<T>> for State<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) if err.is_transient() => Self::Retry(err),
            Err(err) => Self::Stop(err),
        }
    }
}

/// Decides whether retrying is allowed based on the retries made so far and the retry limit.
///
/// # Errors
///
/// Returns [`Err<()>`] if retrying is not allowed, otherwise [`Ok<()>`] is returned.
#[allow(clippy::result_unit_err)]
pub fn retry_if_possible(retry: &mut u8, max_retries: u8) -> std::result::Result<(), ()> {
    *retry = retry.saturating_add(1);
    if *retry > max_retries {
        if max_retries > 0 {
            error!("retried for too many times ({max_retries}), stopping!");
        }
        Err(())
    } else {
        warn!("retrying… ({retry} / {max_retries})");
        Ok(())
    }
}
