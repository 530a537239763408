//! Reviewer selection commands: `policy-reviewers select` and `leaves`.

use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use policy_reviewers::config::ReviewersConfig;
use policy_reviewers::find_random_requesters;
use policy_reviewers::policy::EvaluationResult;
use policy_reviewers::pull::github::parse_repo_slug;
use policy_reviewers::pull::{FixtureContext, GitHubContext};
use policy_reviewers::reviewer::find_reviewable_leaves;

/// Where directory lookups are answered from.
#[derive(Debug, Clone)]
pub enum Source {
    Fixture(PathBuf),
    GitHub {
        owner: String,
        name: String,
        number: u64,
    },
}

impl Source {
    pub fn from_args(fixture: Option<&Path>, repo: Option<&str>, pr: Option<u64>) -> Result<Self> {
        match (fixture, repo, pr) {
            (Some(path), _, _) => Ok(Source::Fixture(path.to_path_buf())),
            (None, Some(slug), Some(number)) => {
                let Some((owner, name)) = parse_repo_slug(slug) else {
                    bail!("Invalid repository '{}'. Expected owner/name", slug);
                };
                Ok(Source::GitHub {
                    owner,
                    name,
                    number,
                })
            }
            _ => bail!("Either --fixture or both --repo and --pr are required"),
        }
    }
}

fn load_result(path: &Path) -> Result<EvaluationResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read result file: {}", path.display()))?;
    EvaluationResult::from_json(&content)
        .with_context(|| format!("Failed to parse result file: {}", path.display()))
}

fn print_logins(logins: &[String], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(logins)?);
    } else {
        for login in logins {
            println!("{}", login);
        }
    }
    Ok(())
}

pub async fn cmd_select(
    project_dir: &Path,
    result_path: &Path,
    source: Source,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let config = ReviewersConfig::new(project_dir.to_path_buf(), seed)?;
    let tree = load_result(result_path)?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let reviewers = match source {
        Source::Fixture(path) => {
            let ctx = FixtureContext::load(&path)?;
            find_random_requesters(&ctx, &tree, &mut rng).await
        }
        Source::GitHub {
            owner,
            name,
            number,
        } => {
            let ctx =
                GitHubContext::for_pull_request(config.github_settings(), &owner, &name, number)
                    .await
                    .with_context(|| {
                        format!("Failed to load pull request {}/{}#{}", owner, name, number)
                    })?;
            find_random_requesters(&ctx, &tree, &mut rng).await
        }
    }
    .context("Failed to select reviewers")?;

    info!(count = reviewers.len(), "Selected reviewers");
    print_logins(&reviewers, json)
}

#[derive(Debug, Serialize)]
struct LeafSummary<'a> {
    name: &'a str,
    required_count: usize,
}

pub fn cmd_leaves(result_path: &Path, json: bool) -> Result<()> {
    let tree = load_result(result_path)?;
    let leaves: Vec<LeafSummary> = find_reviewable_leaves(&tree)
        .into_iter()
        .map(|leaf| LeafSummary {
            name: &leaf.name,
            required_count: leaf
                .review_request_rule
                .as_ref()
                .map_or(0, |rule| rule.required_count),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&leaves)?);
        return Ok(());
    }

    if leaves.is_empty() {
        println!("No pending rules need reviewers.");
    }
    for leaf in &leaves {
        println!("{}\t{}", leaf.name, leaf.required_count);
    }
    Ok(())
}
