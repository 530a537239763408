//! Static repository directory loaded from a file.
//!
//! Used for dry runs of a policy against a known directory and as the test
//! double for the selection core. A section that is absent from the file
//! behaves like a failed lookup, which is how missing data shows up against
//! the real API as well.
//!
//! # File Format
//!
//! ```toml
//! author = "alice"
//! owner = "acme"
//! name = "widgets"
//!
//! [collaborators]
//! bob = "write"
//! carol = "admin"
//!
//! [direct_collaborators]
//! carol = "admin"
//!
//! [teams]
//! platform = "admin"
//!
//! [team_members]
//! "acme/platform" = ["carol", "dave"]
//!
//! [organization_members]
//! acme = ["bob", "carol", "dave"]
//!
//! [organization_owners]
//! acme = ["carol"]
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::{PermissionMap, RepositoryContext};
use crate::errors::LookupError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureContext {
    pub author: String,
    pub owner: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_collaborators: Option<PermissionMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaborators: Option<PermissionMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<PermissionMap>,
    #[serde(default)]
    pub team_members: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub organization_members: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub organization_owners: HashMap<String, Vec<String>>,
}

impl FixtureContext {
    pub fn new(
        author: impl Into<String>,
        owner: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            owner: owner.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Load a fixture; `.json` files are read as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture file: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse fixture JSON: {}", path.display()))
        } else {
            Self::parse(&content)
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse fixture TOML")
    }

    fn repo_slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

fn listing<T: Clone>(value: Option<&T>, what: impl FnOnce() -> String) -> Result<T, LookupError> {
    value
        .cloned()
        .ok_or_else(|| LookupError::NotFound { what: what() })
}

#[async_trait]
impl RepositoryContext for FixtureContext {
    fn author(&self) -> &str {
        &self.author
    }

    fn repository_owner(&self) -> &str {
        &self.owner
    }

    fn repository_name(&self) -> &str {
        &self.name
    }

    async fn direct_repository_collaborators(&self) -> Result<PermissionMap, LookupError> {
        listing(self.direct_collaborators.as_ref(), || {
            format!("direct collaborators of {}", self.repo_slug())
        })
    }

    async fn repository_collaborators(&self) -> Result<PermissionMap, LookupError> {
        listing(self.collaborators.as_ref(), || {
            format!("collaborators of {}", self.repo_slug())
        })
    }

    async fn teams(&self) -> Result<PermissionMap, LookupError> {
        listing(self.teams.as_ref(), || format!("teams of {}", self.repo_slug()))
    }

    async fn team_members(&self, team: &str) -> Result<Vec<String>, LookupError> {
        listing(self.team_members.get(team), || format!("team {}", team))
    }

    async fn organization_members(&self, org: &str) -> Result<Vec<String>, LookupError> {
        listing(self.organization_members.get(org), || {
            format!("members of organization {}", org)
        })
    }

    async fn organization_owners(&self, org: &str) -> Result<Vec<String>, LookupError> {
        listing(self.organization_owners.get(org), || {
            format!("owners of organization {}", org)
        })
    }
}
