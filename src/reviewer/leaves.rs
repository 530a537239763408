//! Locating the rules that still need reviewers.

use crate::policy::{EvaluationResult, EvaluationStatus};

/// Collect the reviewable leaves under `result`, depth-first, left to right.
///
/// A reviewable leaf has no children, is pending, and carries no evaluation
/// error. Only pending children are descended into: an approved, disapproved
/// or skipped subtree is already decided and needs nobody.
pub fn find_reviewable_leaves(result: &EvaluationResult) -> Vec<&EvaluationResult> {
    let mut leaves = Vec::new();
    collect(result, &mut leaves);
    leaves
}

fn collect<'a>(node: &'a EvaluationResult, leaves: &mut Vec<&'a EvaluationResult>) {
    if node.is_leaf() {
        if node.status == EvaluationStatus::Pending && node.error.is_none() {
            leaves.push(node);
        }
        return;
    }

    for child in node.children.iter().flatten() {
        if child.status == EvaluationStatus::Pending {
            collect(child, leaves);
        }
    }
}
