//! Identifies the repository and workflow an operation targets.

use std::{
    convert::Infallible,
    fmt::{self, Display},
    str::FromStr,
};

use crate::{Error, Result};

/// The repository and branch an operation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryCoordinate {
    owner: String,
    repo: String,
    branch: String,
}

impl RepositoryCoordinate {
    /// Creates a [`RepositoryCoordinate`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if any of the parts is empty.
    pub fn new<O, R, B>(owner: O, repo: R, branch: B) -> Result<Self>
    where
        O: Into<String>,
        R: Into<String>,
        B: Into<String>,
    {
        let coordinate = Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        };

        for (name, value) in [
            ("owner", &coordinate.owner),
            ("repo", &coordinate.repo),
            ("branch", &coordinate.branch),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Configuration(format!(
                    "repository {name} must not be empty"
                )));
            }
        }

        Ok(coordinate)
    }

    /// The account or organization owning the repository.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// The branch files are read from and written to.
    pub fn branch(&self) -> &str {
        &self.branch
    }
}

impl Display for RepositoryCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

/// A workflow, referenced by its file name or numeric id.
///
/// The reference is only ever used as a path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum WorkflowReference {
    /// A file name under `.github/workflows`, e.g. `codeql.yml`.
    FileName(String),
    /// The numeric workflow id.
    Id(u64),
}

impl WorkflowReference {
    /// Renders the reference as a path segment.
    pub fn as_segment(&self) -> String {
        self.to_string()
    }
}

impl Display for WorkflowReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileName(name) => f.write_str(name),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for WorkflowReference {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.parse::<u64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::FileName(s.to_owned()),
        })
    }
}

impl From<u64> for WorkflowReference {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for WorkflowReference {
    fn from(name: &str) -> Self {
        Self::FileName(name.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_rejects_empty_parts() {
        assert!(RepositoryCoordinate::new("octo", "repo", "main").is_ok());

        for (owner, repo, branch) in [
            ("", "repo", "main"),
            ("octo", " ", "main"),
            ("octo", "repo", ""),
        ] {
            let err = RepositoryCoordinate::new(owner, repo, branch).unwrap_err();
            assert!(matches!(err, Error::Configuration(_)), "{err}");
        }
    }

    #[test]
    fn workflow_reference_parses_ids_and_file_names() {
        assert_eq!("161335".parse::<WorkflowReference>().unwrap(), WorkflowReference::Id(161335));
        assert_eq!(
            "codeql.yml".parse::<WorkflowReference>().unwrap(),
            WorkflowReference::FileName(String::from("codeql.yml"))
        );
        assert_eq!(WorkflowReference::Id(7).as_segment(), "7");
    }
}
