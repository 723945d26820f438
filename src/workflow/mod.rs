//! GitHub Actions workflows: metadata and the operations controlling them.

#![cfg(feature = "workflow")]

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::Deserialize;

mod control;
mod dispatch;

pub use control::*;
pub use dispatch::*;

/// Represents a GitHub Actions workflow from GitHub REST API.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Workflow {
    pub id: u64,
    pub name: String,
    pub path: String,
    /// `active`, `disabled_manually`, `disabled_inactivity`, ... as reported by the API.
    pub state: String,
    /// Normalized to UTC. The offset the API reported is not kept.
    pub created_at: DateTime<Utc>,
    /// Normalized to UTC. The offset the API reported is not kept.
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub badge_url: Option<String>,
}

impl Display for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} at {}) {}, updated {}",
            self.name,
            self.id,
            self.path,
            self.state,
            self.updated_at.to_rfc3339()
        )
    }
}

/// Represents a page of workflows from GitHub REST API.
#[derive(Debug, Deserialize, Clone)]
pub struct Workflows {
    pub total_count: u64,
    pub workflows: Vec<Workflow>,
}
