//! Downloads the packaged release of a commit from GitHub Actions.

use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing_subscriber::EnvFilter;

use packaged_release::{
    Error, RetrievalRequest, env,
    github::GitHub,
    retrieve,
    retrieve::DEFAULT_WORKFLOW,
    shutdown::cancel_on_signal,
    transactions::WaitOptions,
    workflow::Repository,
};

#[derive(Parser, Debug)]
#[command(
    name = "get-packaged-release",
    version,
    about = "Downloads the packaged release of a commit from GitHub Actions"
)]
struct Args {
    /// The GitHub API token to use [default: $GITHUB_TOKEN]
    #[arg(long, alias = "github_token", value_name = "TOKEN")]
    github_token: Option<String>,

    /// The git hash, or a prefix of it, to look for
    #[arg(long)]
    sha: String,

    /// The GitHub repo the deploy workflow runs in [default: $GITHUB_REPOSITORY]
    #[arg(long, alias = "github_repo", value_name = "OWNER/NAME")]
    github_repo: Option<String>,

    /// The directory to download the built artifacts to [default: current directory]
    #[arg(long, alias = "output_dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// The time between checks while waiting for the deploy run to finish
    #[arg(long, alias = "poll_interval_s", value_name = "SECS", default_value_t = 60)]
    poll_interval_s: u64,

    /// The deploy workflow, by file name or id
    #[arg(long, default_value = DEFAULT_WORKFLOW)]
    workflow: String,

    /// Give up if the deploy run has not finished after this long [default: wait forever]
    #[arg(long, value_name = "SECS")]
    max_wait_s: Option<u64>,

    /// Retries for transient failures while polling the deploy run [default: $MAX_RETRIES or 0]
    #[arg(long, value_name = "N")]
    max_retries: Option<u8>,

    /// The base URL of GitHub REST API [default: $GITHUB_API_URL or https://api.github.com]
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,
}

impl Args {
    fn into_parts(self) -> Result<(GitHub, RetrievalRequest), Error> {
        let token = self
            .github_token
            .or_else(|| env::GITHUB_TOKEN.clone())
            .ok_or_else(|| {
                Error::Config("a GitHub token is required, pass --github-token".to_owned())
            })?;
        let repo: Repository = self
            .github_repo
            .or_else(|| env::GITHUB_REPOSITORY.clone())
            .ok_or_else(|| {
                Error::Config("a GitHub repo is required, pass --github-repo".to_owned())
            })?
            .parse()?;
        let output_dir = match self.output_dir {
            Some(output_dir) => output_dir,
            None => std::env::current_dir().map_err(|source| Error::Io {
                path: PathBuf::from("."),
                source,
            })?,
        };

        let client = GitHub::new(
            self.api_url
                .unwrap_or_else(|| env::GITHUB_API_URL.clone()),
            token,
        )?;
        let request = RetrievalRequest {
            sha: self.sha,
            repo,
            workflow: self.workflow,
            output_dir,
            wait: WaitOptions {
                poll_interval: Duration::from_secs(self.poll_interval_s),
                max_wait: self.max_wait_s.map(Duration::from_secs),
                max_retries: self.max_retries.unwrap_or(*env::MAX_RETRIES),
            },
        };

        Ok((client, request))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("ERROR: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let (client, request) = args.into_parts()?;

    let cancel = CancellationToken::new();
    cancel_on_signal(cancel.clone());

    let result = retrieve(&client, &request, &cancel).await;
    cancel.cancel();

    for path in result? {
        println!("{}", path.display());
    }
    Ok(())
}
