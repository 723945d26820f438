use std::{path::PathBuf, process::ExitCode};

use actions_remote::{
    Error,
    client::GitHubClient,
    env,
    operation::{self, Operation},
    repository::{RepositoryCoordinate, WorkflowReference},
    workflow::{DEFAULT_LANGUAGES, DEFAULT_QUERIES, ScanParameters},
};
use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};

const DEFAULT_WORKFLOW: &str = "codeql.yml";

#[derive(Debug, Parser)]
#[command(name = "actions-remote", version)]
#[command(about = "Push, dispatch, enable, disable, and inspect GitHub Actions workflows")]
struct Cli {
    /// Repository owner
    #[arg(long, env = "GITHUB_OWNER")]
    owner: String,
    /// Repository name
    #[arg(long, env = "GITHUB_REPOSITORY_NAME")]
    repo: String,
    /// Branch files are written to and runs default to
    #[arg(long, default_value = "main")]
    branch: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create or update a workflow file from a local file
    Push {
        /// Local workflow file
        file: PathBuf,
        /// Path in the repository [default: .github/workflows/<file name>]
        #[arg(long)]
        path: Option<String>,
    },
    /// Dispatch a workflow run
    Dispatch {
        /// Workflow file name or id
        #[arg(long, default_value = DEFAULT_WORKFLOW)]
        workflow: WorkflowReference,
        /// Comma-separated languages to analyze
        #[arg(long, default_value = DEFAULT_LANGUAGES)]
        languages: String,
        /// Query suite to run
        #[arg(long, default_value = DEFAULT_QUERIES)]
        queries: String,
        /// Upload results as SARIF
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        upload_sarif: bool,
        /// Ref to run on [default: the branch]
        #[arg(long = "ref")]
        git_ref: Option<String>,
    },
    /// Enable a workflow
    Enable {
        /// Workflow file name or id
        #[arg(long, default_value = DEFAULT_WORKFLOW)]
        workflow: WorkflowReference,
    },
    /// Disable a workflow
    Disable {
        /// Workflow file name or id
        #[arg(long, default_value = DEFAULT_WORKFLOW)]
        workflow: WorkflowReference,
    },
    /// Show a workflow
    Status {
        /// Workflow file name or id
        #[arg(long, default_value = DEFAULT_WORKFLOW)]
        workflow: WorkflowReference,
    },
    /// List every workflow of the repository
    List,
}

impl From<Command> for Operation {
    fn from(command: Command) -> Self {
        match command {
            Command::Push { file, path } => Self::Push {
                source: file,
                destination: path,
            },
            Command::Dispatch {
                workflow,
                languages,
                queries,
                upload_sarif,
                git_ref,
            } => Self::Dispatch {
                workflow,
                parameters: ScanParameters {
                    languages,
                    queries,
                    upload_sarif,
                    git_ref,
                },
            },
            Command::Enable { workflow } => Self::Enable { workflow },
            Command::Disable { workflow } => Self::Disable { workflow },
            Command::Status { workflow } => Self::Status { workflow },
            Command::List => Self::List,
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let coordinate = RepositoryCoordinate::new(cli.owner, cli.repo, cli.branch)?;
    let client = GitHubClient::new(env::credential()?, env::client_config()?)
        .context("failed to build the HTTP client")?;

    let result = operation::execute(&client, &coordinate, cli.command.into()).await?;
    println!("{result}");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if let Some(hint) = err.downcast_ref::<Error>().and_then(Error::hint) {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}
