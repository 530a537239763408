//! Random reviewer selection for pending policy rules.
//!
//! ## Components
//!
//! - [`leaves`]: finds the pending, error-free leaves that need reviewers
//! - [`admins`]: resolves administrators at user, team or org scope
//! - [`candidates`]: builds the eligible candidate pool for one rule
//! - [`sample`]: picks reviewers uniformly without replacement
//!
//! ## Example
//!
//! ```no_run
//! use policy_reviewers::policy::EvaluationResult;
//! use policy_reviewers::pull::FixtureContext;
//! use policy_reviewers::reviewer::find_random_requesters;
//! use rand::SeedableRng;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let ctx = FixtureContext::load(std::path::Path::new("repo.toml"))?;
//! let tree = EvaluationResult::from_json(&std::fs::read_to_string("result.json")?)?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let reviewers = find_random_requesters(&ctx, &tree, &mut rng).await?;
//! # Ok(())
//! # }
//! ```

pub mod admins;
pub mod candidates;
pub mod leaves;
pub mod sample;

pub use admins::resolve_admins;
pub use candidates::build_candidates;
pub use leaves::find_reviewable_leaves;
pub use sample::sample_unique;

use rand::Rng;
use tracing::debug;

use crate::errors::ReviewerError;
use crate::policy::EvaluationResult;
use crate::pull::RepositoryContext;

/// Pick reviewers for every pending rule under `result`.
///
/// Leaves are processed in traversal order and their selections concatenated.
/// The first fatal error aborts the whole batch: a partial list would be
/// submitted as a single review request downstream.
pub async fn find_random_requesters<C, R>(
    ctx: &C,
    result: &EvaluationResult,
    rng: &mut R,
) -> Result<Vec<String>, ReviewerError>
where
    C: RepositoryContext + ?Sized,
    R: Rng + ?Sized,
{
    let pending = find_reviewable_leaves(result);
    debug!("Collecting reviewers for {} pending leaf nodes", pending.len());

    let mut requested = Vec::new();
    for leaf in pending {
        let Some(rule) = &leaf.review_request_rule else {
            debug!(rule = %leaf.name, "Pending rule has no review request settings, skipping");
            continue;
        };

        let candidates = build_candidates(ctx, rule, rng).await?;
        debug!(
            rule = %leaf.name,
            "Randomly selecting {} of {} candidates",
            rule.required_count,
            candidates.len()
        );
        requested.extend(sample_unique(rule.required_count, &candidates, rng)?);
    }

    Ok(requested)
}
