//! The HTTP transport to the GitHub REST API.

#![cfg(feature = "client")]

use std::{
    fmt::{self, Debug, Display},
    time::Duration,
};

use reqwest::{
    Method, StatusCode, Url,
    header::{self, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, error};

use crate::{ApiError, Error, Result, repository::RepositoryCoordinate};

/// The public GitHub REST API host.
pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// The REST API version every request pins.
pub const API_VERSION: &str = "2022-11-28";
/// The media type every request accepts.
pub const ACCEPT: &str = "application/vnd.github+json";
/// Identifies this client to the API.
pub const USER_AGENT: &str = concat!("actions-remote/", env!("CARGO_PKG_VERSION"));

/// An opaque bearer token. Never printed.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    /// Wraps a token.
    pub fn new(token: &str) -> Self {
        Self(token.to_owned())
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// Where and how requests are sent.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The API base. May carry a path prefix, e.g. `https://ghe.example.com/api/v3`.
    pub base_url: Url,
    /// An optional per-request timeout. `None` leaves the transport defaults in place.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a [`ClientConfig`] for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the URL cannot be parsed or cannot carry a path.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Configuration(format!("invalid API URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!("invalid API URL {base_url}")));
        }

        Ok(Self {
            base_url,
            timeout: None,
        })
    }
}

/// A server-relative API path, kept as raw segments until it is rendered against the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl ApiPath {
    /// Starts a path from raw segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
        }
    }

    /// Starts a path at `/repos/{owner}/{repo}`.
    pub fn repo(coordinate: &RepositoryCoordinate) -> Self {
        Self::new(["repos", coordinate.owner(), coordinate.repo()])
    }

    /// Appends one segment. The segment is percent-encoded when rendered.
    pub fn push<S>(mut self, segment: S) -> Self
    where
        S: Into<String>,
    {
        self.segments.push(segment.into());
        self
    }

    /// Appends a slash-separated path, one segment per component.
    pub fn extend_path(mut self, path: &str) -> Self {
        self.segments.extend(
            path.split('/')
                .filter(|segment| !segment.is_empty())
                .map(ToOwned::to_owned),
        );
        self
    }

    /// Appends a query pair.
    pub fn query<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Renders the path against a base URL, keeping any path prefix of the base.
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(&self.segments);
        }
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        url
    }
}

impl Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        for (i, (key, value)) in self.query.iter().enumerate() {
            let separator = if i == 0 { '?' } else { '&' };
            write!(f, "{separator}{key}={value}")?;
        }
        Ok(())
    }
}

/// A response body: JSON when it parses, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Payload {
    /// A JSON document.
    Json(Value),
    /// Anything else, including the empty body of a `204 No Content`.
    Text(String),
}

impl Payload {
    fn parse(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text.to_owned()),
        }
    }
}

/// A successful response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// The 2xx status.
    pub status: StatusCode,
    /// The collected body.
    pub body: Payload,
    /// The body exactly as received.
    pub raw: String,
}

impl ApiResponse {
    /// Narrows the payload to an explicit schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the payload does not match `T`.
    pub fn json<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = self.status;
        let decoded = match self.body {
            Payload::Json(value) => serde_json::from_value(value),
            Payload::Text(text) => serde_json::from_str(&text),
        };
        decoded.map_err(|source| Error::Decode { status, source })
    }
}

/// An authenticated client for the GitHub REST API.
///
/// Each call performs exactly one request. Nothing is retried.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: Url,
    credential: Credential,
}

impl GitHubClient {
    /// Creates a [`GitHubClient`] from a credential and a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the underlying HTTP client cannot be built.
    pub fn new(credential: Credential, config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url,
            credential,
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issues a single request and collects the response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if no response was received, and [`Error::Api`] for any
    /// status outside `2xx`.
    pub async fn request<B>(
        &self,
        method: Method,
        path: &ApiPath,
        body: Option<&B>,
    ) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = path.to_url(&self.base_url);
        debug!("{method} {path}…");

        let mut request = self
            .client
            .request(method.clone(), url)
            .bearer_auth(&self.credential.0)
            .header(header::ACCEPT, ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION);

        if let Some(body) = body {
            // The body length becomes the `Content-Length` header.
            let bytes = serde_json::to_vec(body).map_err(Error::Encode)?;
            request = request
                .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(bytes);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                error!("failed to {method} {path}: {err}");
                return Err(Error::Transport(err));
            }
        };

        let status = response.status();
        let text = response.text().await.map_err(|err| {
            error!("failed to read the response of {method} {path}: {err}");
            Error::Transport(err)
        })?;

        if status.is_success() {
            debug!("{method} {path}: {}", status.as_u16());
            Ok(ApiResponse {
                status,
                body: Payload::parse(&text),
                raw: text,
            })
        } else {
            let err = ApiError::new(status, text);
            debug!("{method} {path}: {err}");
            Err(Error::Api(err))
        }
    }

    /// Issues a `GET` request.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn get(&self, path: &ApiPath) -> Result<ApiResponse> {
        self.request::<Value>(Method::GET, path, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header as header_eq, method, path, query_param},
    };

    fn client_for(server: &MockServer) -> GitHubClient {
        let config = ClientConfig::new(&server.uri()).unwrap();
        GitHubClient::new(Credential::new("t0ken"), config).unwrap()
    }

    #[test]
    fn path_is_rendered_below_base_prefix() {
        let coordinate = RepositoryCoordinate::new("octo", "hello world", "main").unwrap();
        let path = ApiPath::repo(&coordinate)
            .push("contents")
            .extend_path(".github/workflows/codeql.yml")
            .query("ref", coordinate.branch());
        let base = Url::parse("https://ghe.example.com/api/v3").unwrap();

        assert_eq!(
            path.to_url(&base).as_str(),
            "https://ghe.example.com/api/v3/repos/octo/hello%20world/contents/.github/workflows/codeql.yml?ref=main"
        );
        assert_eq!(
            path.to_string(),
            "/repos/octo/hello world/contents/.github/workflows/codeql.yml?ref=main"
        );
    }

    #[test]
    fn credential_is_redacted() {
        assert_eq!(format!("{:?}", Credential::new("secret")), "Credential([REDACTED])");
    }

    #[tokio::test]
    async fn request_attaches_github_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/repo/actions/workflows"))
            .and(header_eq("authorization", "Bearer t0ken"))
            .and(header_eq("accept", ACCEPT))
            .and(header_eq("x-github-api-version", API_VERSION))
            .and(header_eq("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total_count": 0 })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .get(&ApiPath::new(["repos", "octo", "repo", "actions", "workflows"]))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, Payload::Json(json!({ "total_count": 0 })));
    }

    #[tokio::test]
    async fn request_serializes_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header_eq("content-type", "application/json"))
            .and(query_param("page", "2"))
            .and(body_json(json!({ "ref": "main" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .request(
                Method::POST,
                &ApiPath::new(["echo"]).query("page", 2),
                Some(&json!({ "ref": "main" })),
            )
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert_eq!(response.body, Payload::Text(String::new()));
    }

    #[tokio::test]
    async fn non_success_status_is_preserved() {
        let server = MockServer::start().await;
        for (route, status) in [("/unauthorized", 401), ("/forbidden", 403), ("/broken", 500)] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(
                    ResponseTemplate::new(status).set_body_string(r#"{"message":"nope"}"#),
                )
                .mount(&server)
                .await;
        }

        let client = client_for(&server);
        for (route, status) in [("unauthorized", 401), ("forbidden", 403), ("broken", 500)] {
            match client.get(&ApiPath::new([route])).await {
                Err(Error::Api(err)) => {
                    assert_eq!(err.status.as_u16(), status);
                    assert_eq!(err.message, "nope");
                    assert_eq!(err.body, r#"{"message":"nope"}"#);
                }
                other => panic!("expected an API error for {route}, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let config = ClientConfig::new(&format!("http://{address}")).unwrap();
        let client = GitHubClient::new(Credential::new("t0ken"), config).unwrap();
        let result = client.get(&ApiPath::new(["repos"])).await;
        assert!(matches!(result, Err(Error::Transport(_))), "{result:?}");
    }

    #[test]
    fn json_narrows_payload() {
        #[derive(Debug, serde::Deserialize)]
        struct Count {
            total_count: u32,
        }

        let response = ApiResponse {
            status: StatusCode::OK,
            body: Payload::Json(json!({ "total_count": 3 })),
            raw: String::from(r#"{"total_count":3}"#),
        };
        assert_eq!(response.json::<Count>().unwrap().total_count, 3);

        let response = ApiResponse {
            status: StatusCode::OK,
            body: Payload::Text(String::from("not json")),
            raw: String::from("not json"),
        };
        assert!(matches!(response.json::<Count>(), Err(Error::Decode { .. })));
    }
}
