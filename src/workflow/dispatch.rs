use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::{error, info};

use crate::{
    ApiError, Error, Result,
    client::GitHubClient,
    repository::{RepositoryCoordinate, WorkflowReference},
    workflow::control::workflow_path,
};

/// The value of a dispatch input. Forwarded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum InputValue {
    /// A string input.
    String(String),
    /// A boolean input.
    Bool(bool),
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// The body of a `workflow_dispatch` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchRequest {
    /// The branch or tag the run uses.
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// The inputs declared by the workflow. Not validated here.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, InputValue>,
}

impl DispatchRequest {
    /// Creates a request without inputs.
    pub fn new<R>(git_ref: R) -> Self
    where
        R: Into<String>,
    {
        Self {
            git_ref: git_ref.into(),
            inputs: BTreeMap::new(),
        }
    }

    /// Adds an input.
    pub fn input<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<InputValue>,
    {
        self.inputs.insert(key.into(), value.into());
        self
    }
}

/// The languages scanned when none are given.
pub const DEFAULT_LANGUAGES: &str = "python,javascript-typescript";
/// The query suite used when none is given.
pub const DEFAULT_QUERIES: &str = "security-extended";

/// The inputs of a code-scanning workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanParameters {
    /// Comma-separated languages to analyze.
    pub languages: String,
    /// The query suite to run.
    pub queries: String,
    /// Whether results are uploaded as SARIF.
    pub upload_sarif: bool,
    /// The ref to run on. Defaults to the repository branch.
    pub git_ref: Option<String>,
}

impl Default for ScanParameters {
    fn default() -> Self {
        Self {
            languages: String::from(DEFAULT_LANGUAGES),
            queries: String::from(DEFAULT_QUERIES),
            upload_sarif: true,
            git_ref: None,
        }
    }
}

impl ScanParameters {
    /// Builds the dispatch request, running on `coordinate`'s branch unless a ref was given.
    ///
    /// `upload_sarif` is sent as the string `"true"` or `"false"`, the form workflow inputs
    /// of type `string` expect.
    pub fn into_request(self, coordinate: &RepositoryCoordinate) -> DispatchRequest {
        let git_ref = self
            .git_ref
            .unwrap_or_else(|| coordinate.branch().to_owned());

        DispatchRequest::new(git_ref)
            .input("languages", self.languages)
            .input("queries", self.queries)
            .input("upload_sarif", self.upload_sarif.to_string())
    }
}

/// A dispatch the API accepted.
///
/// The API does not report the run it creates, so the run is not identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    /// The dispatched workflow.
    pub workflow: WorkflowReference,
    /// The ref the run was requested on.
    pub git_ref: String,
}

impl Display for DispatchReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dispatch of {} on {} accepted, run identity unknown",
            self.workflow, self.git_ref
        )
    }
}

/// Dispatches a run of a workflow.
///
/// Only `204 No Content` is accepted.
///
/// # Errors
///
/// Returns [`Error::Api`] with the received status for any other status, `2xx` included, and
/// [`Error::Transport`] on network failure.
pub async fn dispatch(
    client: &GitHubClient,
    coordinate: &RepositoryCoordinate,
    workflow: &WorkflowReference,
    request: &DispatchRequest,
) -> Result<DispatchReceipt> {
    let path = workflow_path(coordinate, workflow).push("dispatches");
    let response = client.request(Method::POST, &path, Some(request)).await?;

    if response.status != StatusCode::NO_CONTENT {
        error!(
            "unexpected status dispatching workflow {workflow} in {coordinate}: {}",
            response.status.as_u16()
        );
        return Err(Error::Api(ApiError::new(response.status, response.raw)));
    }

    info!("dispatched workflow {workflow} on {}", request.git_ref);
    Ok(DispatchReceipt {
        workflow: workflow.clone(),
        git_ref: request.git_ref.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path},
    };

    use crate::client::{ClientConfig, Credential};

    const ROUTE: &str = "/repos/octo/repo/actions/workflows/codeql.yml/dispatches";

    fn setup(server: &MockServer) -> (GitHubClient, RepositoryCoordinate) {
        let config = ClientConfig::new(&server.uri()).unwrap();
        (
            GitHubClient::new(Credential::new("t0ken"), config).unwrap(),
            RepositoryCoordinate::new("octo", "repo", "main").unwrap(),
        )
    }

    fn scan_request() -> DispatchRequest {
        DispatchRequest::new("main")
            .input("languages", "python,javascript-typescript")
            .input("queries", "security-extended")
            .input("upload_sarif", "true")
    }

    #[test]
    fn scan_parameters_default_to_branch() {
        let coordinate = RepositoryCoordinate::new("octo", "repo", "main").unwrap();
        assert_eq!(ScanParameters::default().into_request(&coordinate), scan_request());

        let request = ScanParameters {
            git_ref: Some(String::from("v1.2.0")),
            upload_sarif: false,
            ..ScanParameters::default()
        }
        .into_request(&coordinate);
        assert_eq!(request.git_ref, "v1.2.0");
        assert_eq!(request.inputs["upload_sarif"], InputValue::from("false"));
    }

    #[test]
    fn inputs_serialize_verbatim() {
        let request = DispatchRequest::new("main")
            .input("debug", true)
            .input("target", "all");

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "ref": "main", "inputs": { "debug": true, "target": "all" } })
        );
        assert_eq!(
            serde_json::to_value(DispatchRequest::new("main")).unwrap(),
            json!({ "ref": "main" })
        );
    }

    #[tokio::test]
    async fn dispatch_accepts_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ROUTE))
            .and(body_json(json!({
                "ref": "main",
                "inputs": {
                    "languages": "python,javascript-typescript",
                    "queries": "security-extended",
                    "upload_sarif": "true",
                },
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let (client, coordinate) = setup(&server);
        let workflow = WorkflowReference::from("codeql.yml");
        let receipt = dispatch(&client, &coordinate, &workflow, &scan_request())
            .await
            .unwrap();

        assert_eq!(receipt.workflow, workflow);
        assert_eq!(receipt.git_ref, "main");
    }

    #[tokio::test]
    async fn dispatch_rejects_other_statuses() {
        let raw = r#"{"zeta": 1,  "message": "accepted"}"#;
        for status in [200, 201, 422] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path(ROUTE))
                .respond_with(
                    ResponseTemplate::new(status).set_body_raw(raw, "application/json"),
                )
                .expect(1)
                .mount(&server)
                .await;

            let (client, coordinate) = setup(&server);
            let err = dispatch(&client, &coordinate, &"codeql.yml".into(), &scan_request())
                .await
                .unwrap_err();

            let Error::Api(api) = &err else {
                panic!("expected an API error for {status}, got {err}");
            };
            assert_eq!(api.status.as_u16(), status);
            assert_eq!(api.body, raw);
            assert_eq!(api.message, "accepted");
        }
    }
}
