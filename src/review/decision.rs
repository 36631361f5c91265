// File: src/review/decision.rs
use crate::core::candidate::RankedCandidate;
use serde::{Deserialize, Serialize};

/// Whether a rejection concerns the surface form under review or only prunes
/// one candidate as a side effect of another answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionScope {
    Form,
    Candidate,
}

/// A reviewer's answer about one surface form.
///
/// A plain decision only records the form and whether it was rejected. A
/// sorted-set decision also records the ranked candidates it removed, in
/// removal order, so it can be undone and replayed. `Clone` copies the
/// removed set; clones never share state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    surface_form: String,
    rejected: bool,
    removed: Option<Vec<RankedCandidate>>,
}

impl Decision {
    pub fn new(surface_form: impl Into<String>, rejected: bool) -> Self {
        Self {
            surface_form: surface_form.into(),
            rejected,
            removed: None,
        }
    }

    /// A decision that tracks removed candidates.
    pub fn sorted_set(surface_form: impl Into<String>, rejected: bool) -> Self {
        Self {
            surface_form: surface_form.into(),
            rejected,
            removed: Some(Vec::new()),
        }
    }

    pub fn surface_form(&self) -> &str {
        &self.surface_form
    }

    pub fn is_rejected(&self) -> bool {
        self.rejected
    }

    pub fn tracks_candidates(&self) -> bool {
        self.removed.is_some()
    }

    pub fn removed_candidates(&self) -> &[RankedCandidate] {
        self.removed.as_deref().unwrap_or(&[])
    }

    /// Records `candidate` as removed. Duplicates (same stem and paradigm)
    /// are ignored.
    pub fn add_candidate(&mut self, candidate: RankedCandidate) {
        let removed = self.removed.get_or_insert_with(Vec::new);
        if !removed.contains(&candidate) {
            removed.push(candidate);
        }
    }

    /// Removes `candidate` from `pending` and records it. The rejected flag
    /// follows `scope`. Returns false, recording nothing, when the
    /// candidate was not pending.
    pub fn reject(
        &mut self,
        candidate: &RankedCandidate,
        pending: &mut Vec<RankedCandidate>,
        scope: RejectionScope,
    ) -> bool {
        let Some(pos) = pending.iter().position(|c| c == candidate) else {
            return false;
        };
        let removed = pending.remove(pos);
        self.add_candidate(removed);
        self.rejected = scope == RejectionScope::Form;
        true
    }

    /// Marks the form as accepted. Removes nothing.
    pub fn accept(&mut self) {
        self.rejected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::candidate::Candidate;

    fn ranked(stem: &str, paradigm: &str, score: f64) -> RankedCandidate {
        RankedCandidate::new(Candidate::new(stem, paradigm), score)
    }

    #[test]
    fn reject_moves_candidate_out_of_pending() {
        let mut pending = vec![ranked("gat", "N", 0.6), ranked("gat", "Vb", 0.4)];
        let mut decision = Decision::sorted_set("gatos", false);

        assert!(decision.reject(&ranked("gat", "Vb", 0.0), &mut pending, RejectionScope::Form));
        assert_eq!(pending.len(), 1);
        assert!(decision.is_rejected());
        assert_eq!(decision.removed_candidates().len(), 1);
        // removed copy keeps the pending score, not the probe's
        assert_eq!(decision.removed_candidates()[0].score, 0.4);
    }

    #[test]
    fn candidate_scope_leaves_form_accepted() {
        let mut pending = vec![ranked("gat", "N", 0.6), ranked("gat", "Vb", 0.4)];
        let mut decision = Decision::sorted_set("gato", false);
        decision.accept();
        decision.reject(&ranked("gat", "Vb", 0.4), &mut pending, RejectionScope::Candidate);
        assert!(!decision.is_rejected());
        assert_eq!(decision.removed_candidates().len(), 1);
    }

    #[test]
    fn rejecting_missing_candidate_records_nothing() {
        let mut pending = vec![ranked("gat", "N", 1.0)];
        let mut decision = Decision::sorted_set("x", false);
        assert!(!decision.reject(&ranked("foo", "N", 1.0), &mut pending, RejectionScope::Form));
        assert!(decision.removed_candidates().is_empty());
        assert!(!decision.is_rejected());
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn accept_removes_nothing() {
        let mut decision = Decision::new("gato", true);
        decision.accept();
        assert!(!decision.is_rejected());
        assert!(!decision.tracks_candidates());
        assert!(decision.removed_candidates().is_empty());
    }

    #[test]
    fn clones_are_independent() {
        let mut original = Decision::sorted_set("gatos", true);
        original.add_candidate(ranked("gat", "N", 0.5));

        let mut copy = original.clone();
        copy.add_candidate(ranked("gat", "Vb", 0.5));
        copy.accept();

        assert_eq!(original.removed_candidates().len(), 1);
        assert_eq!(original.removed_candidates()[0].paradigm(), "N");
        assert!(original.is_rejected());
        assert_eq!(copy.removed_candidates().len(), 2);
    }

    #[test]
    fn duplicate_candidates_collapse() {
        let mut decision = Decision::sorted_set("x", true);
        decision.add_candidate(ranked("gat", "N", 0.1));
        decision.add_candidate(ranked("gat", "N", 0.9));
        assert_eq!(decision.removed_candidates().len(), 1);
    }
}
