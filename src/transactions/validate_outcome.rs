use tracing::{error, info};

use crate::{
    error::{Error, Result},
    workflow::{Conclusion, WorkflowRun},
};

/// Accepts a completed run only if it succeeded.
///
/// # Errors
///
/// Returns [`Error::WorkflowFailed`] with the actual conclusion otherwise. A completed run without a
/// conclusion is reported as `"none"`.
pub fn validate_outcome(run: WorkflowRun) -> Result<WorkflowRun> {
    if run.conclusion == Some(Conclusion::Success) {
        info!("run {run} succeeded");
        return Ok(run);
    }

    let conclusion = run
        .conclusion
        .clone()
        .unwrap_or_else(|| Conclusion::Other("none".to_owned()));
    error!("run {run} finished with conclusion {conclusion}");
    Err(Error::WorkflowFailed {
        run_id: run.id,
        conclusion,
    })
}
