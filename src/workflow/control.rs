use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    Result,
    client::{ApiPath, GitHubClient},
    repository::{RepositoryCoordinate, WorkflowReference},
    workflow::{Workflow, Workflows},
};

/// The page size used when listing workflows. The API caps it at 100.
pub const PER_PAGE: u32 = 100;

pub(crate) fn workflows_path(coordinate: &RepositoryCoordinate) -> ApiPath {
    ApiPath::repo(coordinate).push("actions").push("workflows")
}

pub(crate) fn workflow_path(
    coordinate: &RepositoryCoordinate,
    workflow: &WorkflowReference,
) -> ApiPath {
    workflows_path(coordinate).push(workflow.as_segment())
}

/// Enables a workflow. Enabling an active workflow succeeds as well.
///
/// # Errors
///
/// Returns [`crate::Error::Api`] for any status outside `2xx`, e.g. `404` for an unknown
/// workflow, and [`crate::Error::Transport`] on network failure.
pub async fn enable(
    client: &GitHubClient,
    coordinate: &RepositoryCoordinate,
    workflow: &WorkflowReference,
) -> Result<()> {
    let path = workflow_path(coordinate, workflow).push("enable");
    client.request::<Value>(Method::PUT, &path, None).await?;
    info!("enabled workflow {workflow} in {coordinate}");
    Ok(())
}

/// Disables a workflow. Disabling a disabled workflow succeeds as well.
///
/// # Errors
///
/// See [`enable`].
pub async fn disable(
    client: &GitHubClient,
    coordinate: &RepositoryCoordinate,
    workflow: &WorkflowReference,
) -> Result<()> {
    let path = workflow_path(coordinate, workflow).push("disable");
    client.request::<Value>(Method::PUT, &path, None).await?;
    info!("disabled workflow {workflow} in {coordinate}");
    Ok(())
}

/// Fetches the metadata of a workflow.
///
/// # Errors
///
/// Returns [`crate::Error::Api`] for any status outside `2xx`, and [`crate::Error::Decode`] if
/// the response is not a workflow.
pub async fn status(
    client: &GitHubClient,
    coordinate: &RepositoryCoordinate,
    workflow: &WorkflowReference,
) -> Result<Workflow> {
    let workflow = client
        .get(&workflow_path(coordinate, workflow))
        .await?
        .json::<Workflow>()?;
    debug!("fetched workflow {workflow}");
    Ok(workflow)
}

/// Lists every workflow of the repository, following pages until `total_count` is reached.
///
/// # Errors
///
/// Returns the first error of any page request. Workflows of earlier pages are discarded.
pub async fn list(
    client: &GitHubClient,
    coordinate: &RepositoryCoordinate,
) -> Result<Vec<Workflow>> {
    let mut workflows = Vec::new();

    for page in 1.. {
        let path = workflows_path(coordinate)
            .query("per_page", PER_PAGE)
            .query("page", page);
        let Workflows {
            total_count,
            workflows: batch,
        } = client.get(&path).await?.json::<Workflows>()?;
        debug!(
            "fetched page {page} of workflows in {coordinate}: {} of {total_count}",
            batch.len()
        );

        let exhausted = batch.is_empty();
        workflows.extend(batch);
        if exhausted || workflows.len() as u64 >= total_count {
            break;
        }
    }

    match workflows.len() {
        1 => info!("fetched 1 workflow from {coordinate}"),
        count => info!("fetched {count} workflows from {coordinate}"),
    }
    Ok(workflows)
}
