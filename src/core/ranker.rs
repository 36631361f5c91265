use crate::bilingual::Relationship;
use crate::config::RankingWeights;
use crate::core::candidate::{sort_by_score, Candidate, RankedCandidate};
use crate::core::types::Dictionary;
use std::collections::HashMap;

/// Scores (stem, paradigm) candidates for an ambiguous surface form.
///
/// Two signals are combined:
/// - the relationship score from each known source paradigm (the paradigm
///   the word's translation uses in the other language) to the candidate's
///   paradigm;
/// - corpus attestation: attested forms / sqrt(generated forms).
///
/// Combined scores are softmax-normalised so they sum to 1.
pub struct Ranker<'a> {
    dictionary: &'a Dictionary,
    relationship: Option<&'a Relationship>,
    corpus: Option<&'a HashMap<String, u64>>,
    weights: RankingWeights,
    limit: usize,
}

impl<'a> Ranker<'a> {
    pub fn new(dictionary: &'a Dictionary, weights: RankingWeights) -> Self {
        Self {
            dictionary,
            relationship: None,
            corpus: None,
            weights,
            limit: 0,
        }
    }

    pub fn with_relationship(mut self, relationship: &'a Relationship) -> Self {
        self.relationship = Some(relationship);
        self
    }

    pub fn with_corpus(mut self, corpus: &'a HashMap<String, u64>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    /// Keeps at most `limit` candidates; 0 keeps all.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn rank(&self, candidates: Vec<Candidate>, source_paradigms: &[String]) -> Vec<RankedCandidate> {
        if candidates.is_empty() {
            return Vec::new();
        }

        // 1. Raw score per candidate
        let raw: Vec<f64> = candidates
            .iter()
            .map(|c| {
                self.weights.relationship * self.relationship_score(c, source_paradigms)
                    + self.weights.attestation * self.attestation_score(c)
            })
            .collect();

        // 2. Softmax, shifted by the max for stability
        let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = raw.iter().map(|s| (s - max).exp()).collect();
        let sum: f64 = exps.iter().sum();

        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .zip(exps)
            .map(|(candidate, e)| RankedCandidate::new(candidate, e / sum))
            .collect();

        // 3. Sort by score (descending), ties keep input order
        sort_by_score(&mut ranked);

        // 4. Return the top K results
        if self.limit > 0 {
            ranked.truncate(self.limit);
        }
        tracing::debug!(kept = ranked.len(), "candidates ranked");
        ranked
    }

    fn relationship_score(&self, candidate: &Candidate, sources: &[String]) -> f64 {
        let Some(relationship) = self.relationship else {
            return 0.0;
        };
        sources
            .iter()
            .map(|source| relationship.score(source, &candidate.paradigm))
            .sum()
    }

    fn attestation_score(&self, candidate: &Candidate) -> f64 {
        let Some(corpus) = self.corpus else {
            return 0.0;
        };
        let forms = candidate.surface_forms(self.dictionary);
        if forms.is_empty() {
            return 0.0;
        }
        let attested = forms.iter().filter(|form| corpus.contains_key(*form)).count();
        attested as f64 / (forms.len() as f64).sqrt()
    }
}
