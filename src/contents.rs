//! Repository file contents: resolving a file's current version and creating or updating it.

#![cfg(feature = "contents")]

use std::fmt::{self, Display};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    Error, Result,
    client::{ApiPath, GitHubClient},
    repository::RepositoryCoordinate,
};

/// A file in the repository, with the concurrency token observed for it, if any.
///
/// A target is resolved right before it is written and never reused across invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTarget {
    /// The path relative to the repository root.
    pub path: String,
    /// The `sha` of the current blob. `None` if the file does not exist.
    pub sha: Option<String>,
}

impl FileTarget {
    /// Whether the file exists at the resolved ref.
    pub fn exists(&self) -> bool {
        self.sha.is_some()
    }
}

/// Whether a publish created a new file or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PublishAction {
    /// The file did not exist.
    Created,
    /// The file existed and was replaced atomically.
    Updated,
}

impl PublishAction {
    fn verb(self) -> &'static str {
        match self {
            Self::Created => "Add",
            Self::Updated => "Update",
        }
    }
}

impl Display for PublishAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Updated => f.write_str("updated"),
        }
    }
}

/// The commit a publish produced.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitReference {
    /// The commit sha.
    pub sha: String,
    /// The commit page, when the API reports one.
    #[serde(default)]
    pub html_url: Option<String>,
    /// The commit message.
    #[serde(default)]
    pub message: String,
}

/// The outcome of [`publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    /// The path that was written.
    pub path: String,
    /// Whether the file was created or updated.
    pub action: PublishAction,
    /// The new blob sha of the file.
    pub content_sha: Option<String>,
    /// The commit that carries the change.
    pub commit: CommitReference,
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PutContentResponse {
    content: Option<ContentFile>,
    commit: CommitReference,
}

#[derive(Debug, Serialize)]
struct PutContentRequest<'a> {
    message: String,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

fn contents_path(coordinate: &RepositoryCoordinate, path: &str) -> ApiPath {
    ApiPath::repo(coordinate).push("contents").extend_path(path)
}

/// Resolves whether `path` exists on the coordinate's branch, and its concurrency token.
///
/// A `404` means the file is absent and is not an error.
///
/// # Errors
///
/// Returns [`Error::Transport`] on network failure, [`Error::Api`] for any status other than
/// `2xx` and `404`, and [`Error::Decode`] if the path is not a single file.
pub async fn resolve(
    client: &GitHubClient,
    coordinate: &RepositoryCoordinate,
    path: &str,
) -> Result<FileTarget> {
    let api_path = contents_path(coordinate, path).query("ref", coordinate.branch());
    debug!("resolving {path} on {coordinate}…");

    match client.get(&api_path).await {
        Ok(response) => {
            let file = response.json::<ContentFile>()?;
            debug!("resolved {path} on {coordinate} at {}", file.sha);
            Ok(FileTarget {
                path: path.to_owned(),
                sha: Some(file.sha),
            })
        }
        Err(Error::Api(err)) if err.status == StatusCode::NOT_FOUND => {
            debug!("{path} does not exist on {coordinate}");
            Ok(FileTarget {
                path: path.to_owned(),
                sha: None,
            })
        }
        Err(err) => Err(err),
    }
}

/// Creates or updates `path` with `content` on the coordinate's branch.
///
/// The file is resolved first and the `PUT` only carries a concurrency token when one was
/// observed, so a concurrent write makes the API reject the request instead of being
/// overwritten. The commit message is `Add {subject}` or `Update {subject}`.
///
/// # Errors
///
/// Returns any error of [`resolve`], in which case nothing is written, and the errors of the
/// `PUT` itself, including the conflict status of a stale token.
pub async fn publish(
    client: &GitHubClient,
    coordinate: &RepositoryCoordinate,
    path: &str,
    content: &[u8],
    subject: &str,
) -> Result<Publication> {
    let target = resolve(client, coordinate, path).await?;
    let action = if target.exists() {
        PublishAction::Updated
    } else {
        PublishAction::Created
    };

    let request = PutContentRequest {
        message: format!("{} {subject}", action.verb()),
        content: STANDARD.encode(content),
        branch: coordinate.branch(),
        sha: target.sha.as_deref(),
    };

    let response = match client
        .request(Method::PUT, &contents_path(coordinate, path), Some(&request))
        .await
    {
        Ok(response) => response,
        Err(err) => {
            warn!("failed to publish {path} to {coordinate}: {err}");
            return Err(err);
        }
    };
    let response = response.json::<PutContentResponse>()?;

    info!("{action} {path} on {coordinate} in {}", response.commit.sha);
    Ok(Publication {
        path: target.path,
        action,
        content_sha: response.content.map(|content| content.sha),
        commit: response.commit,
    })
}
