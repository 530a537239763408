//! Typed error hierarchy for reviewer selection.
//!
//! Two enums cover the two layers:
//! - `LookupError`: a directory query made through a `RepositoryContext` failed
//! - `ReviewerError`: candidate assembly, admin resolution, or sampling failed

use thiserror::Error;

/// A directory lookup (collaborators, teams, members, owners) failed.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GitHub returned status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{what} not found")]
    NotFound { what: String },
}

/// Errors from the reviewer selection core.
#[derive(Debug, Error)]
pub enum ReviewerError {
    /// A directory call made while resolving admins failed.
    #[error("{context}: {source}")]
    Lookup {
        context: String,
        #[source]
        source: LookupError,
    },

    /// A required step of candidate assembly failed.
    #[error("Unable to {step}: {source}")]
    Aggregation {
        step: &'static str,
        #[source]
        source: Box<ReviewerError>,
    },

    #[error("Unknown admin scope '{scope}'")]
    UnsupportedScope { scope: String },

    #[error(
        "Unable to select {requested} unique reviewers from {available} candidates within {attempts} draws"
    )]
    Sampling {
        requested: usize,
        available: usize,
        attempts: usize,
    },
}

impl ReviewerError {
    pub(crate) fn lookup(context: impl Into<String>, source: LookupError) -> Self {
        ReviewerError::Lookup {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn aggregation(step: &'static str, source: ReviewerError) -> Self {
        ReviewerError::Aggregation {
            step,
            source: Box::new(source),
        }
    }

    /// True when the admin scope itself was rejected.
    pub fn is_unsupported_scope(&self) -> bool {
        matches!(self, ReviewerError::UnsupportedScope { .. })
    }

    /// The directory failure at the bottom of the chain, if any.
    pub fn root_lookup(&self) -> Option<&LookupError> {
        match self {
            ReviewerError::Lookup { source, .. } => Some(source),
            ReviewerError::Aggregation { source, .. } => source.root_lookup(),
            ReviewerError::UnsupportedScope { .. } | ReviewerError::Sampling { .. } => None,
        }
    }
}
