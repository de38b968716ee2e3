use tracing::{debug, error, info};

use crate::{
    error::{Error, Result},
    github::ActionsApi,
    workflow::{Repository, WorkflowRun},
};

/// Finds the only run of `workflow` whose head commit starts with `sha`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if no run matches, [`Error::AmbiguousMatch`] if more than one does,
/// or the error of listing the runs.
pub async fn locate_run<C>(
    client: &C,
    repo: &Repository,
    workflow: &str,
    sha: &str,
) -> Result<WorkflowRun>
where
    C: ActionsApi,
{
    debug!("looking for runs of {workflow} in {repo} at {sha}…");

    let mut runs: Vec<WorkflowRun> = client
        .list_workflow_runs(repo, workflow)
        .await?
        .into_iter()
        .filter(|run| run.head_sha.starts_with(sha))
        .collect();

    match runs.len() {
        0 => {
            error!("could not find a run of {workflow} for {sha}");
            Err(Error::NotFound {
                sha: sha.to_owned(),
            })
        }
        1 => {
            let run = runs.remove(0);
            info!("found run {run} of {workflow}");
            Ok(run)
        }
        count => {
            error!("found {count} runs of {workflow} for {sha}, refusing to pick one");
            Err(Error::AmbiguousMatch {
                sha: sha.to_owned(),
                count,
            })
        }
    }
}
