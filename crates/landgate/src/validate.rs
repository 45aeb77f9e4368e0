//! Patch eligibility gate evaluated before any working-tree work begins.

use landgate_domain::{Patch, ReviewDisposition};

/// Stateless precondition check on a patch.
pub struct PatchValidator;

impl PatchValidator {
    /// Whether the patch is still eligible to land.
    ///
    /// A patch is ineligible when it is obsolete, its parent issue is no
    /// longer open, nobody is assigned to commit it, or review explicitly
    /// rejected it. A pending review does not block landing here; approval
    /// enforcement belongs to the queue that feeds this task.
    pub fn validate(patch: &Patch) -> bool {
        if patch.obsolete {
            return false;
        }
        if !patch.issue_open {
            return false;
        }
        if patch.committer.is_none() {
            return false;
        }
        if patch.review == ReviewDisposition::Rejected {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eligible() -> Patch {
        Patch::new(10000).with_committer("committer@example.com")
    }

    #[test]
    fn test_default_patch_with_committer_is_eligible() {
        assert!(PatchValidator::validate(&eligible()));
    }

    #[test]
    fn test_obsolete_patch_is_ineligible() {
        assert!(!PatchValidator::validate(&eligible().obsoleted()));
    }

    #[test]
    fn test_closed_issue_is_ineligible() {
        assert!(!PatchValidator::validate(&eligible().with_issue_closed()));
    }

    #[test]
    fn test_missing_committer_is_ineligible() {
        assert!(!PatchValidator::validate(&Patch::new(10000)));
    }

    #[test]
    fn test_rejected_review_is_ineligible() {
        assert!(!PatchValidator::validate(
            &eligible().with_review(ReviewDisposition::Rejected)
        ));
    }

    #[test]
    fn test_approved_review_is_eligible() {
        assert!(PatchValidator::validate(
            &eligible().with_review(ReviewDisposition::Approved)
        ));
    }
}
