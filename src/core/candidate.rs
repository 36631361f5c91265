// File: src/core/candidate.rs
use crate::core::expansion::expand_paradigm;
use crate::core::types::{Dictionary, Node, ParadigmName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// One hypothesis for how a word is encoded: a stem plus the paradigm that
/// inflects it. Ordered by stem, then paradigm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Candidate {
    pub stem: String,
    pub paradigm: ParadigmName,
}

impl Candidate {
    pub fn new(stem: impl Into<String>, paradigm: impl Into<String>) -> Self {
        Self { stem: stem.into(), paradigm: paradigm.into() }
    }

    /// Every surface form the stem produces through its paradigm.
    /// Empty when the paradigm is unknown.
    pub fn surface_forms(&self, dic: &Dictionary) -> BTreeSet<String> {
        expand_paradigm(&self.paradigm, &self.stem, false, dic).unwrap_or_default()
    }

    /// Stem plus the generation text of the paradigm's first pair rule.
    pub fn lemma(&self, dic: &Dictionary) -> Option<String> {
        let paradigm = dic.paradigm(&self.paradigm)?;
        let first = paradigm.rules.first()?;
        first.children.iter().find_map(|node| match node {
            Node::Pair { right, .. } => Some(format!("{}{}", self.stem, right.text)),
            _ => None,
        })
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.stem, self.paradigm)
    }
}

/// A candidate with a ranking score.
///
/// Identity is the (stem, paradigm) pair only: two ranked candidates that
/// differ just in score are the same hypothesis and collapse in sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub candidate: Candidate,
    pub score: f64,
}

impl RankedCandidate {
    pub fn new(candidate: Candidate, score: f64) -> Self {
        Self { candidate, score }
    }

    pub fn stem(&self) -> &str {
        &self.candidate.stem
    }

    pub fn paradigm(&self) -> &str {
        &self.candidate.paradigm
    }
}

impl PartialEq for RankedCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.candidate == other.candidate
    }
}

impl Eq for RankedCandidate {}

impl Hash for RankedCandidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.candidate.hash(state);
    }
}

impl fmt::Display for RankedCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.4})", self.candidate, self.score)
    }
}

/// Sorts by descending score; ties keep their incoming order.
pub fn sort_by_score(candidates: &mut [RankedCandidate]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Entry, Paradigm, Side};
    use std::collections::HashSet;

    #[test]
    fn ranked_identity_ignores_score() {
        let a = RankedCandidate::new(Candidate::new("parl", "Vb"), 0.9);
        let b = RankedCandidate::new(Candidate::new("parl", "Vb"), 0.1);
        assert_eq!(a, b);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn display_uses_pipe() {
        assert_eq!(Candidate::new("cas", "cas/a__n").to_string(), "cas|cas/a__n");
    }

    #[test]
    fn lemma_uses_first_rule_generation_text() {
        let mut dic = Dictionary::new();
        dic.add_paradigm(Paradigm::new(
            "Vb",
            vec![
                Entry::new(vec![Node::pair(Side::new("ar"), Side::with_tags("ar", ["inf"]))]),
                Entry::new(vec![Node::pair(Side::new("o"), Side::with_tags("ar", ["pri"]))]),
            ],
        ));
        assert_eq!(Candidate::new("parl", "Vb").lemma(&dic).as_deref(), Some("parlar"));
        assert_eq!(Candidate::new("parl", "Nope").lemma(&dic), None);
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let mut v = vec![
            RankedCandidate::new(Candidate::new("a", "x"), 0.2),
            RankedCandidate::new(Candidate::new("b", "x"), 0.5),
            RankedCandidate::new(Candidate::new("c", "x"), 0.2),
        ];
        sort_by_score(&mut v);
        let stems: Vec<_> = v.iter().map(|c| c.stem()).collect();
        assert_eq!(stems, ["b", "a", "c"]);
    }
}
