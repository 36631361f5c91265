// File: src/review/session.rs
use crate::core::candidate::{sort_by_score, Candidate, RankedCandidate};
use crate::core::types::Dictionary;
use crate::review::decision::{Decision, RejectionScope};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One reviewer working through the ranked candidates of an ambiguous word.
///
/// The reviewer is asked about surface forms generated by some, but not
/// all, pending candidates. Accepting a form prunes the candidates that do
/// not generate it; rejecting a form removes those that do. Every answer is
/// kept as a [`Decision`] so it can be undone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSession {
    word: String,
    ranked: Vec<RankedCandidate>,
    pending: Vec<RankedCandidate>,
    #[serde(with = "forms_as_list")]
    forms: BTreeMap<Candidate, BTreeSet<String>>,
    decisions: Vec<Decision>,
}

impl ReviewSession {
    pub fn new(word: impl Into<String>, mut ranked: Vec<RankedCandidate>, dic: &Dictionary) -> Self {
        sort_by_score(&mut ranked);
        let mut seen = BTreeSet::new();
        ranked.retain(|c| seen.insert(c.candidate.clone()));
        let forms = ranked
            .iter()
            .map(|c| (c.candidate.clone(), c.candidate.surface_forms(dic)))
            .collect();
        Self {
            word: word.into(),
            pending: ranked.clone(),
            ranked,
            forms,
            decisions: Vec::new(),
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    /// Candidates still in play, best first.
    pub fn pending(&self) -> &[RankedCandidate] {
        &self.pending
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn forms_of(&self, candidate: &Candidate) -> Option<&BTreeSet<String>> {
        self.forms.get(candidate)
    }

    fn generates(&self, candidate: &RankedCandidate, form: &str) -> bool {
        self.forms
            .get(&candidate.candidate)
            .is_some_and(|forms| forms.contains(form))
    }

    fn is_decided(&self, form: &str) -> bool {
        self.decisions.iter().any(|d| d.surface_form() == form)
    }

    /// The first undecided form of the best pending candidate that splits
    /// the pending set. `None` once no form can tell the candidates apart.
    pub fn next_form_to_ask(&self) -> Option<&str> {
        for candidate in &self.pending {
            let Some(forms) = self.forms.get(&candidate.candidate) else {
                continue;
            };
            for form in forms {
                if self.is_decided(form) {
                    continue;
                }
                if self.pending.iter().all(|other| self.generates(other, form)) {
                    continue;
                }
                return Some(form.as_str());
            }
        }
        None
    }

    /// Records `form` as valid and prunes every pending candidate unable to
    /// generate it. Returns how many were pruned.
    pub fn accept_form(&mut self, form: &str) -> usize {
        let mut decision = Decision::sorted_set(form, false);
        decision.accept();
        let pruned: Vec<RankedCandidate> = self
            .pending
            .iter()
            .filter(|c| !self.generates(c, form))
            .cloned()
            .collect();
        for candidate in &pruned {
            decision.reject(candidate, &mut self.pending, RejectionScope::Candidate);
        }
        tracing::debug!(form, pruned = pruned.len(), left = self.pending.len(), "form accepted");
        self.decisions.push(decision);
        pruned.len()
    }

    /// Records `form` as invalid and removes every pending candidate that
    /// generates it. Returns how many were removed.
    pub fn reject_form(&mut self, form: &str) -> usize {
        let mut decision = Decision::sorted_set(form, true);
        let removed: Vec<RankedCandidate> = self
            .pending
            .iter()
            .filter(|c| self.generates(c, form))
            .cloned()
            .collect();
        for candidate in &removed {
            decision.reject(candidate, &mut self.pending, RejectionScope::Form);
        }
        tracing::debug!(form, removed = removed.len(), left = self.pending.len(), "form rejected");
        self.decisions.push(decision);
        removed.len()
    }

    /// Undoes the last decision, putting its candidates back in rank order.
    pub fn go_back(&mut self) -> Option<Decision> {
        let decision = self.decisions.pop()?;
        let still_removed: BTreeSet<&Candidate> = self
            .decisions
            .iter()
            .flat_map(|d| d.removed_candidates())
            .map(|c| &c.candidate)
            .collect();
        self.pending = self
            .ranked
            .iter()
            .filter(|c| !still_removed.contains(&c.candidate))
            .cloned()
            .collect();
        Some(decision)
    }

    /// The remaining candidates, once no further question can separate them.
    pub fn solution(&self) -> Option<&[RankedCandidate]> {
        if self.pending.is_empty() || self.next_form_to_ask().is_some() {
            return None;
        }
        Some(&self.pending)
    }

    pub fn is_finished(&self) -> bool {
        self.next_form_to_ask().is_none()
    }
}

/// JSON maps need string keys, so the per-candidate forms travel as a list
/// of (candidate, forms) pairs.
mod forms_as_list {
    use crate::core::candidate::Candidate;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::{BTreeMap, BTreeSet};

    pub fn serialize<S: Serializer>(
        forms: &BTreeMap<Candidate, BTreeSet<String>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(forms.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Candidate, BTreeSet<String>>, D::Error> {
        let list: Vec<(Candidate, BTreeSet<String>)> = Vec::deserialize(deserializer)?;
        Ok(list.into_iter().collect())
    }
}
