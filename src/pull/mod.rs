//! Pull request context: the directory the reviewer selection queries.
//!
//! | Module    | Backing store                                           |
//! |-----------|---------------------------------------------------------|
//! | `github`  | GitHub REST API, scoped to one pull request             |
//! | `fixture` | Static directory loaded from TOML/JSON (dry runs, tests)|

pub mod fixture;
pub mod github;

use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::LookupError;
use crate::policy::Permission;

pub use fixture::FixtureContext;
pub use github::GitHubContext;

/// Login → permission mapping returned by collaborator and team listings.
pub type PermissionMap = HashMap<String, Permission>;

/// Directory lookups for the repository a pull request targets.
/// Real implementation: `GitHubContext`. Static implementation: `FixtureContext`.
#[async_trait]
pub trait RepositoryContext: Send + Sync {
    /// Login of the pull request author.
    fn author(&self) -> &str;

    fn repository_owner(&self) -> &str;

    fn repository_name(&self) -> &str;

    /// Collaborators added to the repository directly, with their permission.
    async fn direct_repository_collaborators(&self) -> Result<PermissionMap, LookupError>;

    /// Every collaborator, including those with access through teams or the org.
    async fn repository_collaborators(&self) -> Result<PermissionMap, LookupError>;

    /// Teams attached to the repository (slug → permission).
    async fn teams(&self) -> Result<PermissionMap, LookupError>;

    /// Members of a team identified as `org/slug`.
    async fn team_members(&self, team: &str) -> Result<Vec<String>, LookupError>;

    async fn organization_members(&self, org: &str) -> Result<Vec<String>, LookupError>;

    async fn organization_owners(&self, org: &str) -> Result<Vec<String>, LookupError>;
}
