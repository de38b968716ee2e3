use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    error::{Error, Result},
    framework::until_cancelled,
    github::ActionsApi,
    workflow::{WorkflowRun, artifact::Artifact},
};

/// Downloads every artifact of `run` to `<output_dir>/<name>.zip`, one at a time in listing order.
///
/// Existing files are overwritten. The first failed download aborts the whole call; archives
/// already saved are kept. `cancel` is checked before every download and ends a running one,
/// removing its partial archive.
///
/// # Errors
///
/// Returns [`Error::NoArtifacts`] if the run has no artifacts, [`Error::Config`] if two artifacts
/// would be saved to the same file or a name leaves nothing to save to, [`Error::Io`] if the output
/// directory cannot be created, [`Error::Cancelled`] once `cancel` fires, or the error of the
/// listing or the first failed download.
pub async fn download_artifacts<C>(
    client: &C,
    run: &WorkflowRun,
    output_dir: &Path,
    cancel: &CancellationToken,
) -> Result<Vec<PathBuf>>
where
    C: ActionsApi,
{
    let artifacts = until_cancelled(cancel, client.list_artifacts(&run.artifacts_url)).await?;
    match artifacts.len() {
        0 => {
            error!("invalid workflow data: no artifacts at {}!", run.artifacts_url);
            return Err(Error::NoArtifacts { run_id: run.id });
        }
        1 => info!("fetched 1 artifact of run {run}"),
        count => info!("fetched {count} artifacts of run {run}"),
    }

    let paths = archive_paths(&artifacts, output_dir)?;

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|source| Error::Io {
            path: output_dir.to_owned(),
            source,
        })?;

    for (artifact, path) in artifacts.iter().zip(&paths) {
        if cancel.is_cancelled() {
            warn!("cancelled before downloading artifact {}", artifact.name);
            return Err(Error::Cancelled);
        }
        if artifact.expired {
            warn!("artifact {artifact} is marked as expired");
        }

        info!(
            "downloading artifact {} to {} ({:.0} MiB) from {}…",
            artifact.name,
            path.display(),
            artifact.size_mib(),
            artifact.archive_download_url
        );
        let written = match until_cancelled(cancel, client.download_artifact(artifact, path)).await
        {
            Ok(written) => written,
            Err(Error::Cancelled) => {
                drop(tokio::fs::remove_file(path).await);
                return Err(Error::Cancelled);
            }
            Err(err) => return Err(err),
        };
        info!("downloaded artifact {} ({written} bytes)", artifact.name);
    }

    Ok(paths)
}

/// The files the artifacts are saved as, in listing order.
fn archive_paths(artifacts: &[Artifact], output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::with_capacity(artifacts.len());

    artifacts
        .iter()
        .map(|artifact| {
            let file_name = archive_file_name(&artifact.name)?;
            if !seen.insert(file_name.clone()) {
                error!("artifact {artifact} would overwrite another artifact at {file_name}");
                return Err(Error::Config(format!(
                    "artifact {:?} collides with another artifact at {file_name}",
                    artifact.name
                )));
            }
            Ok(output_dir.join(file_name))
        })
        .collect()
}

/// The file name an artifact is saved as. Path separators and other unsafe characters are removed.
fn archive_file_name(name: &str) -> Result<String> {
    let sanitized = sanitize_filename::sanitize(name);
    if sanitized.is_empty() {
        error!("artifact name {name:?} leaves nothing to save to");
        return Err(Error::Config(format!(
            "artifact name {name:?} is not a valid file name"
        )));
    }
    Ok(format!("{sanitized}.zip"))
}
