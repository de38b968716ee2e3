use std::time::Duration;

use tokio::time::{Instant, sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    error::{Error, Result},
    framework::{run_with_retries, until_cancelled},
    github::ActionsApi,
    workflow::WorkflowRun,
};

/// The default time between two polls of a run.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Controls how a run is polled.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// The time between two polls.
    pub poll_interval: Duration,
    /// The longest time to wait for the run. Waits forever if [`None`].
    pub max_wait: Option<Duration>,
    /// How many times a transient failure of a single poll is retried.
    pub max_retries: u8,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
            max_retries: 0,
        }
    }
}

impl WaitOptions {
    /// How long to sleep before the next poll after `waited`, or [`None`] once the deadline passed.
    fn next_pause(&self, waited: Duration) -> Option<Duration> {
        match self.max_wait {
            Some(max_wait) if waited >= max_wait => None,
            Some(max_wait) => Some(self.poll_interval.min(max_wait - waited)),
            None => Some(self.poll_interval),
        }
    }
}

/// Polls `run` until it is completed and returns its final snapshot.
///
/// A completed run is returned immediately without any request. Otherwise every iteration checks
/// `cancel` and the deadline, sleeps for the poll interval, and re-fetches the run from its own URL.
/// Both the sleep and the re-fetch end early on cancellation or once the deadline passes.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] once `cancel` fires, [`Error::Timeout`] once
/// [`WaitOptions::max_wait`] has passed, or the error of re-fetching the run.
pub async fn wait_for_completion<C>(
    client: &C,
    mut run: WorkflowRun,
    options: &WaitOptions,
    cancel: &CancellationToken,
) -> Result<WorkflowRun>
where
    C: ActionsApi,
{
    let started = Instant::now();
    let mut polls: u32 = 0;

    while !run.is_completed() {
        if cancel.is_cancelled() {
            warn!("stopped waiting for run {run}: cancelled");
            return Err(Error::Cancelled);
        }

        let waited = started.elapsed();
        let Some(pause) = options.next_pause(waited) else {
            error!("run {run} did not finish within {waited:?}");
            return Err(Error::Timeout {
                run_id: run.id,
                waited,
            });
        };

        info!("run {run} is {}, waiting for {pause:?}…", run.status);
        tokio::select! {
            _ = cancel.cancelled() => {
                warn!("stopped waiting for run {run}: cancelled");
                return Err(Error::Cancelled);
            }
            _ = sleep(pause) => {}
        }

        let run_id = run.id;
        let url = run.url.clone();
        let refetch = until_cancelled(
            cancel,
            run_with_retries(options.max_retries, || client.get_run(&url)),
        );
        run = match options.max_wait {
            Some(max_wait) => {
                let remaining = max_wait.saturating_sub(started.elapsed());
                match timeout(remaining, refetch).await {
                    Ok(result) => result?,
                    Err(_) => {
                        error!("run #{run_id} did not respond within {max_wait:?}");
                        return Err(Error::Timeout {
                            run_id,
                            waited: started.elapsed(),
                        });
                    }
                }
            }
            None => refetch.await?,
        };
        polls += 1;
    }

    info!(
        "run {run} is completed after {polls} polls ({:?})",
        started.elapsed()
    );
    Ok(run)
}
