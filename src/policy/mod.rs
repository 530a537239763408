//! Policy evaluation result tree.
//!
//! The tree is produced by the external policy engine; this crate only reads
//! it. Every node carries a status, an optional evaluation error, and ordered
//! children. Leaves carry the [`ReviewRequestRule`] that says who may be asked
//! for review and how many reviewers the rule wants.
//!
//! # JSON format
//!
//! ```json
//! {
//!   "name": "policy",
//!   "status": "pending",
//!   "children": [
//!     {
//!       "name": "backend owners",
//!       "status": "pending",
//!       "review_request_rule": {
//!         "teams": ["acme/backend"],
//!         "write_collaborators": true,
//!         "required_count": 2
//!       }
//!     },
//!     null
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Evaluation status of a policy node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStatus {
    Approved,
    #[default]
    Pending,
    Disapproved,
    Skipped,
}

impl std::fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationStatus::Approved => write!(f, "approved"),
            EvaluationStatus::Pending => write!(f, "pending"),
            EvaluationStatus::Disapproved => write!(f, "disapproved"),
            EvaluationStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Repository permission level held by a user or team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Admin,
    Maintain,
    #[serde(alias = "push")]
    Write,
    Triage,
    #[serde(alias = "pull")]
    Read,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::Admin => write!(f, "admin"),
            Permission::Maintain => write!(f, "maintain"),
            Permission::Write => write!(f, "write"),
            Permission::Triage => write!(f, "triage"),
            Permission::Read => write!(f, "read"),
        }
    }
}

impl std::str::FromStr for Permission {
    type Err = anyhow::Error;

    /// Accepts both the role names and GitHub's legacy `push`/`pull` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Permission::Admin),
            "maintain" => Ok(Permission::Maintain),
            "write" | "push" => Ok(Permission::Write),
            "triage" => Ok(Permission::Triage),
            "read" | "pull" => Ok(Permission::Read),
            _ => anyhow::bail!(
                "Invalid permission '{}'. Valid values: admin, maintain, write, triage, read",
                s
            ),
        }
    }
}

/// How widely "administrator" is resolved when a rule requests admins.
///
/// | Scope  | Who counts as an admin                                  |
/// |--------|---------------------------------------------------------|
/// | `User` | Direct repository collaborators with admin permission   |
/// | `Team` | Members of teams holding admin permission on the repo   |
/// | `Org`  | Owners of the organization that owns the repository     |
///
/// Any other configured value is kept as `Unrecognized` so that resolution
/// can reject it instead of guessing a scope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AdminScope {
    #[default]
    User,
    Team,
    Org,
    Unrecognized(String),
}

impl From<String> for AdminScope {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "user" => AdminScope::User,
            "team" => AdminScope::Team,
            "org" => AdminScope::Org,
            _ => AdminScope::Unrecognized(value),
        }
    }
}

impl From<AdminScope> for String {
    fn from(scope: AdminScope) -> Self {
        scope.to_string()
    }
}

impl std::fmt::Display for AdminScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminScope::User => write!(f, "user"),
            AdminScope::Team => write!(f, "team"),
            AdminScope::Org => write!(f, "org"),
            AdminScope::Unrecognized(raw) => write!(f, "{}", raw),
        }
    }
}

/// Who may be requested for review on a pending rule, and how many.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequestRule {
    /// Explicit logins.
    #[serde(default)]
    pub users: Vec<String>,
    /// Qualified team identifiers (`org/slug`); one is picked per evaluation.
    #[serde(default)]
    pub teams: Vec<String>,
    /// Organizations; one is picked per evaluation.
    #[serde(default)]
    pub organizations: Vec<String>,
    /// Include every collaborator with exactly write permission.
    #[serde(default)]
    pub write_collaborators: bool,
    /// Restrict eligibility to administrators resolved at `admin_scope`.
    #[serde(default)]
    pub admins: bool,
    #[serde(default)]
    pub admin_scope: AdminScope,
    /// Number of reviewers to request.
    #[serde(default)]
    pub required_count: usize,
}

/// A node of the policy evaluation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: EvaluationStatus,
    /// Evaluation error; a node with an error is never asked for reviewers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Ordered children. `None` entries are holes left by the engine.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Option<EvaluationResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_request_rule: Option<ReviewRequestRule>,
}

impl EvaluationResult {
    /// Create a childless node with the given status.
    pub fn leaf(name: impl Into<String>, status: EvaluationStatus) -> Self {
        Self {
            name: name.into(),
            status,
            ..Self::default()
        }
    }

    /// Create an interior node over `children`.
    pub fn group(
        name: impl Into<String>,
        status: EvaluationStatus,
        children: Vec<EvaluationResult>,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            children: children.into_iter().map(Some).collect(),
            ..Self::default()
        }
    }

    pub fn with_rule(mut self, rule: ReviewRequestRule) -> Self {
        self.review_request_rule = Some(rule);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Parse a result tree from JSON.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}
