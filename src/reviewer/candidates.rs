//! Assembling the candidate pool for one pending rule.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use tracing::{debug, warn};

use super::admins::resolve_admins;
use crate::errors::ReviewerError;
use crate::policy::{Permission, ReviewRequestRule};
use crate::pull::RepositoryContext;

/// Build the eligible candidates for `rule`.
///
/// Explicit users, the members of one randomly chosen team, the members of
/// one randomly chosen organization, and (optionally) every write-level
/// collaborator are merged. When the rule asks for admins, the resolved
/// admins are added and become the only eligible logins; otherwise every
/// repository collaborator is eligible.
///
/// The result never contains the author or anyone outside the eligible set:
/// GitHub rejects a review request outright if a single login in it is the
/// author or lacks access.
///
/// Team and organization lookups are best effort; a failure is logged and
/// that source contributes nobody. Listing collaborators and resolving
/// admins are required.
pub async fn build_candidates<C, R>(
    ctx: &C,
    rule: &ReviewRequestRule,
    rng: &mut R,
) -> Result<Vec<String>, ReviewerError>
where
    C: RepositoryContext + ?Sized,
    R: Rng + ?Sized,
{
    let mut candidates: BTreeSet<String> = rule.users.iter().cloned().collect();

    if let Some(team) = rule.teams.choose(rng) {
        match ctx.team_members(team).await {
            Ok(members) => candidates.extend(members),
            Err(e) => warn!(
                team = %team,
                error = %e,
                "Unable to get member listing for team, skipping team member selection"
            ),
        }
    }

    if let Some(org) = rule.organizations.choose(rng) {
        match ctx.organization_members(org).await {
            Ok(members) => candidates.extend(members),
            Err(e) => warn!(
                org = %org,
                error = %e,
                "Unable to get member listing for org, skipping org member selection"
            ),
        }
    }

    let collaborators = ctx.repository_collaborators().await.map_err(|e| {
        ReviewerError::aggregation(
            "list repository collaborators",
            ReviewerError::lookup("Unable to list repository collaborators", e),
        )
    })?;

    if rule.write_collaborators {
        candidates.extend(
            collaborators
                .iter()
                .filter(|(_, permission)| **permission == Permission::Write)
                .map(|(login, _)| login.clone()),
        );
    }

    let eligible: BTreeSet<String> = if rule.admins {
        let admins = match resolve_admins(ctx, &rule.admin_scope).await {
            Ok(admins) => admins,
            Err(e) if e.is_unsupported_scope() => return Err(e),
            Err(e) => return Err(ReviewerError::aggregation("select admins", e)),
        };
        candidates.extend(admins.iter().cloned());
        admins
    } else {
        collaborators.into_keys().collect()
    };

    let author = ctx.author();
    let filtered: Vec<String> = candidates
        .into_iter()
        .filter(|login| login != author && eligible.contains(login))
        .collect();

    debug!(
        candidates = filtered.len(),
        required = rule.required_count,
        "Found candidates for review after removing author and non-collaborators"
    );

    Ok(filtered)
}
