//! Defines the environment variables to use.

#![cfg(feature = "env")]

use crate::static_lazy_lock;

use std::env;

/// Parses an environment variable from [`String`] to something else, wrapping any error in
/// [`anyhow::Error`].
#[macro_export]
macro_rules! parse_env {
    ($key:expr => |$var:ident| $expr:expr) => {
        std::env::var($key)
            .map_err(|e| anyhow::anyhow!(e))
            .and_then(|$var| $expr)
    };
    ($key:expr => |$var:ident| $expr:expr; anyhow) => {
        $crate::parse_env!($key => |$var| $expr.map_err(|e| anyhow::anyhow!(e)))
    };
}

pub use parse_env;

#[cfg(feature = "env_github_token")]
static_lazy_lock! {
    /// The GitHub token, as set in the environment.
    pub GITHUB_TOKEN: Option<String> = env::var("GITHUB_TOKEN").ok();
}

#[cfg(feature = "env_api")]
static_lazy_lock! {
    /// The base URL of the REST API. Overridden for GitHub Enterprise hosts.
    pub GITHUB_API_URL: String = env::var("GITHUB_API_URL")
        .unwrap_or_else(|_| String::from(crate::client::DEFAULT_API_URL));
}

#[cfg(feature = "env_api")]
static_lazy_lock! {
    /// The request timeout in seconds, `None` when unset. A set but unparsable value is kept as
    /// the parse error.
    pub GITHUB_API_TIMEOUT_SECS: Option<anyhow::Result<u64>> =
        env::var_os("GITHUB_API_TIMEOUT_SECS").map(|_| {
            parse_env!("GITHUB_API_TIMEOUT_SECS" => |s| s.trim().parse::<u64>(); anyhow)
        });
}

/// Reads the credential from `GITHUB_TOKEN`.
///
/// # Errors
///
/// Returns [`crate::Error::MissingCredential`] if the variable is unset or blank.
#[cfg(feature = "env_github_token")]
pub fn credential() -> crate::Result<crate::client::Credential> {
    credential_from(GITHUB_TOKEN.as_deref())
}

#[cfg(feature = "env_github_token")]
fn credential_from(token: Option<&str>) -> crate::Result<crate::client::Credential> {
    token
        .filter(|token| !token.trim().is_empty())
        .map(crate::client::Credential::new)
        .ok_or(crate::Error::MissingCredential("GITHUB_TOKEN"))
}

/// Builds a [`crate::client::ClientConfig`] from `GITHUB_API_URL` and `GITHUB_API_TIMEOUT_SECS`.
///
/// # Errors
///
/// Returns [`crate::Error::Configuration`] if `GITHUB_API_URL` is not a valid URL, or if
/// `GITHUB_API_TIMEOUT_SECS` is set but is not a number of seconds.
#[cfg(feature = "env_api")]
pub fn client_config() -> crate::Result<crate::client::ClientConfig> {
    let mut config = crate::client::ClientConfig::new(&GITHUB_API_URL)?;
    config.timeout = timeout_from(GITHUB_API_TIMEOUT_SECS.as_ref())?;
    Ok(config)
}

#[cfg(feature = "env_api")]
fn timeout_from(
    setting: Option<&anyhow::Result<u64>>,
) -> crate::Result<Option<std::time::Duration>> {
    match setting {
        None => Ok(None),
        Some(Ok(secs)) => Ok(Some(std::time::Duration::from_secs(*secs))),
        Some(Err(err)) => Err(crate::Error::Configuration(format!(
            "invalid GITHUB_API_TIMEOUT_SECS: {err}"
        ))),
    }
}

#[cfg(all(test, feature = "env_github_token", feature = "env_api"))]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::Error;

    #[test]
    fn missing_or_blank_token_is_rejected() {
        for token in [None, Some(""), Some("   ")] {
            let err = credential_from(token).unwrap_err();
            assert!(matches!(err, Error::MissingCredential("GITHUB_TOKEN")), "{err}");
            assert!(err.hint().is_some_and(|hint| hint.contains("GITHUB_TOKEN")));
        }
    }

    #[test]
    fn token_becomes_credential() {
        let credential = credential_from(Some("ghp_abc")).unwrap();
        assert_eq!(format!("{credential:?}"), "Credential([REDACTED])");
    }

    #[test]
    fn timeout_is_parsed_or_rejected() {
        assert_eq!(timeout_from(None).unwrap(), None);
        assert_eq!(timeout_from(Some(&Ok(30))).unwrap(), Some(Duration::from_secs(30)));

        let malformed = Err(anyhow::anyhow!("invalid digit found in string"));
        let err = timeout_from(Some(&malformed)).unwrap_err();
        assert!(
            matches!(&err, Error::Configuration(message)
                if message.contains("GITHUB_API_TIMEOUT_SECS")),
            "{err}"
        );
    }
}
