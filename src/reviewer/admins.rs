//! Resolving administrators for rules that request admin review.

use std::collections::BTreeSet;
use tracing::debug;

use crate::errors::ReviewerError;
use crate::policy::{AdminScope, Permission};
use crate::pull::RepositoryContext;

/// Resolve the admin logins for `scope`.
///
/// - `User`: direct collaborators holding admin permission.
/// - `Team`: members of every team holding admin permission on the
///   repository. One failed member lookup fails the whole resolution.
/// - `Org`: owners of the organization that owns the repository.
///
/// An unrecognized scope is an error; no fallback scope is assumed.
pub async fn resolve_admins<C: RepositoryContext + ?Sized>(
    ctx: &C,
    scope: &AdminScope,
) -> Result<BTreeSet<String>, ReviewerError> {
    match scope {
        AdminScope::User => {
            debug!("Selecting admin users with direct collaboration rights");
            let collaborators = ctx.direct_repository_collaborators().await.map_err(|e| {
                ReviewerError::lookup(
                    format!(
                        "Unable to get list of direct collaborators on {}",
                        ctx.repository_name()
                    ),
                    e,
                )
            })?;

            Ok(collaborators
                .into_iter()
                .filter(|(_, permission)| *permission == Permission::Admin)
                .map(|(login, _)| login)
                .collect())
        }
        AdminScope::Team => {
            debug!("Selecting admin users from teams");
            let teams = ctx.teams().await.map_err(|e| {
                ReviewerError::lookup("Unable to get list of team collaborators", e)
            })?;

            let mut admins = BTreeSet::new();
            for (team, permission) in teams {
                if permission != Permission::Admin {
                    continue;
                }
                let qualified = format!("{}/{}", ctx.repository_owner(), team);
                let members = ctx.team_members(&qualified).await.map_err(|e| {
                    ReviewerError::lookup(format!("Unable to get list of members for {}", team), e)
                })?;
                admins.extend(members);
            }
            Ok(admins)
        }
        AdminScope::Org => {
            debug!("Selecting admin users from the org");
            let owner = ctx.repository_owner();
            let owners = ctx.organization_owners(owner).await.map_err(|e| {
                ReviewerError::lookup(
                    format!("Unable to get list of org owners for {}", owner),
                    e,
                )
            })?;
            Ok(owners.into_iter().collect())
        }
        AdminScope::Unrecognized(raw) => Err(ReviewerError::UnsupportedScope {
            scope: raw.clone(),
        }),
    }
}
