//! Errors surfaced to the command layer.

use std::fmt::{self, Display};

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the Actions API.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The credential variable is unset or blank. Raised before any network call.
    #[error("configuration error: {0} not set in environment")]
    MissingCredential(&'static str),

    /// An invalid coordinate, API setting, or a missing local file. Raised before any network
    /// call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a status the operation does not accept.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// A successful response did not match the expected schema.
    #[error("failed to decode response ({status}): {source}")]
    Decode {
        /// The status of the undecodable response.
        status: StatusCode,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api(err) => Some(err.status),
            Self::Decode { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::MissingCredential(_) | Self::Configuration(_) | Self::Encode(_) => None,
        }
    }

    /// Returns an operator-facing hint for this error, if there is one.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Api(err) => err.hint(),
            Self::MissingCredential(_) => {
                Some("set GITHUB_TOKEN to a token with the repo and workflow scopes")
            }
            _ => None,
        }
    }
}

/// A non-accepted HTTP status returned by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The status exactly as returned by the server.
    pub status: StatusCode,
    /// The `message` field of the error body, or the canonical reason of the status.
    pub message: String,
    /// The raw response body.
    pub body: String,
}

impl ApiError {
    /// Builds an [`ApiError`] from a status and the raw body, extracting GitHub's `message` field.
    pub fn new(status: StatusCode, body: String) -> Self {
        let message = extract_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .map_or_else(|| String::from("request failed"), str::to_lowercase)
        });

        Self {
            status,
            message,
            body,
        }
    }

    /// Returns a hint describing what the operator should check for this status.
    pub fn hint(&self) -> Option<&'static str> {
        match self.status {
            StatusCode::UNAUTHORIZED => {
                Some("authentication rejected, check the GITHUB_TOKEN value")
            }
            StatusCode::FORBIDDEN => Some(
                "authorization rejected, check that the token has the repo and workflow scopes",
            ),
            StatusCode::NOT_FOUND => Some("the repository, file, or workflow does not exist"),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => Some(
                "the remote state changed or the request was rejected, re-run to resolve again",
            ),
            _ => None,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error {}: {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

fn extract_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("message")
        .and_then(|message| message.as_str())
        .map(ToOwned::to_owned)
}
