//! The boundary between the command layer and the API operations.

#![cfg(all(feature = "contents", feature = "workflow"))]

use std::{
    fmt::{self, Display},
    path::PathBuf,
};

use tracing::info;

use crate::{
    Error, Result,
    client::GitHubClient,
    contents::{self, Publication},
    repository::{RepositoryCoordinate, WorkflowReference},
    workflow::{self, DispatchReceipt, ScanParameters, Workflow},
};

/// The directory workflow definitions live in.
pub const WORKFLOWS_DIR: &str = ".github/workflows";

/// A validated intent supplied by the command layer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Operation {
    /// Create or update a workflow definition from a local file.
    Push {
        /// The local file to upload.
        source: PathBuf,
        /// The path in the repository. Defaults to the file name under [`WORKFLOWS_DIR`].
        destination: Option<String>,
    },
    /// Dispatch a run.
    Dispatch {
        /// The workflow to run.
        workflow: WorkflowReference,
        /// The run inputs.
        parameters: ScanParameters,
    },
    /// Enable a workflow.
    Enable {
        /// The workflow to enable.
        workflow: WorkflowReference,
    },
    /// Disable a workflow.
    Disable {
        /// The workflow to disable.
        workflow: WorkflowReference,
    },
    /// Show a workflow.
    Status {
        /// The workflow to show.
        workflow: WorkflowReference,
    },
    /// List the repository's workflows.
    List,
}

/// The result of an [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationResult {
    /// The dispatch was accepted.
    Dispatched(DispatchReceipt),
    /// The workflow is enabled.
    Enabled(WorkflowReference),
    /// The workflow is disabled.
    Disabled(WorkflowReference),
    /// The workflow metadata.
    Status(Workflow),
    /// Every workflow of the repository.
    List(Vec<Workflow>),
    /// The workflow file was written.
    Published(Publication),
}

impl Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispatched(receipt) => write!(f, "{receipt}"),
            Self::Enabled(workflow) => write!(f, "workflow {workflow} enabled"),
            Self::Disabled(workflow) => write!(f, "workflow {workflow} disabled"),
            Self::Status(workflow) => write!(f, "{workflow}"),
            Self::List(workflows) if workflows.is_empty() => f.write_str("no workflows"),
            Self::List(workflows) => {
                for (i, workflow) in workflows.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{workflow}")?;
                }
                Ok(())
            }
            Self::Published(publication) => {
                write!(
                    f,
                    "{} {} in commit {}",
                    publication.action, publication.path, publication.commit.sha
                )?;
                if let Some(url) = &publication.commit.html_url {
                    write!(f, " ({url})")?;
                }
                Ok(())
            }
        }
    }
}

fn destination_of(source: &std::path::Path, destination: Option<String>) -> Result<String> {
    if let Some(destination) = destination {
        return Ok(destination);
    }

    source
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| format!("{WORKFLOWS_DIR}/{name}"))
        .ok_or_else(|| {
            Error::Configuration(format!("{} has no usable file name", source.display()))
        })
}

/// Runs an operation against a repository.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the file to push cannot be read, before any request is
/// made. Otherwise returns the error of the underlying operation unchanged.
pub async fn execute(
    client: &GitHubClient,
    coordinate: &RepositoryCoordinate,
    operation: Operation,
) -> Result<OperationResult> {
    info!("running {operation:?} against {coordinate}");

    match operation {
        Operation::Push {
            source,
            destination,
        } => {
            let destination = destination_of(&source, destination)?;
            let content = tokio::fs::read(&source).await.map_err(|e| {
                Error::Configuration(format!("failed to read {}: {e}", source.display()))
            })?;
            let subject = format!("workflow {destination}");

            contents::publish(client, coordinate, &destination, &content, &subject)
                .await
                .map(OperationResult::Published)
        }
        Operation::Dispatch {
            workflow,
            parameters,
        } => {
            let request = parameters.into_request(coordinate);
            workflow::dispatch(client, coordinate, &workflow, &request)
                .await
                .map(OperationResult::Dispatched)
        }
        Operation::Enable { workflow } => {
            workflow::enable(client, coordinate, &workflow).await?;
            Ok(OperationResult::Enabled(workflow))
        }
        Operation::Disable { workflow } => {
            workflow::disable(client, coordinate, &workflow).await?;
            Ok(OperationResult::Disabled(workflow))
        }
        Operation::Status { workflow } => workflow::status(client, coordinate, &workflow)
            .await
            .map(OperationResult::Status),
        Operation::List => workflow::list(client, coordinate)
            .await
            .map(OperationResult::List),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    #[test]
    fn destination_defaults_to_workflows_dir() {
        assert_eq!(
            destination_of(Path::new("ci/codeql.yml"), None).unwrap(),
            ".github/workflows/codeql.yml"
        );
        assert_eq!(
            destination_of(Path::new("ci/codeql.yml"), Some(String::from("other/scan.yml")))
                .unwrap(),
            "other/scan.yml"
        );
        assert!(matches!(
            destination_of(Path::new("/"), None),
            Err(Error::Configuration(_))
        ));
    }
}
