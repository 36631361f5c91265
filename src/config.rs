// File: src/config.rs
use crate::core::types::{Node, Paradigm, Side};
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Closed grammatical categories shipped with the analyser. Their inventory
/// is small and fixed, so bilingual links between them say little about
/// open-class paradigms.
pub const DEFAULT_CLOSED_CATEGORIES: &[&str] = &[
    "det", "predet", "prn", "pr", "rel", "cnjcoo", "cnjsub", "cnjadv", "preadv", "vbser", "vbhaver",
    "vaux", "vbmod", "num", "ij",
];

/// Tags that match any tag when a bilingual link is resolved against a
/// monolingual dictionary (gender and number left undetermined).
pub const DEFAULT_WILDCARD_TAGS: &[&str] = &["ND", "GD"];

/// Weights of the signals combined by the ranker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub relationship: f64,
    pub attestation: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self { relationship: 1.0, attestation: 1.0 }
    }
}

/// Analyser settings. Every field has a default, so a config file only
/// needs the keys it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    pub closed_category_tags: Vec<String>,
    pub wildcard_tags: Vec<String>,
    pub ranking: RankingWeights,
    /// Candidates kept after ranking; 0 keeps all.
    pub max_candidates: usize,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            closed_category_tags: DEFAULT_CLOSED_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            wildcard_tags: DEFAULT_WILDCARD_TAGS.iter().map(|s| s.to_string()).collect(),
            ranking: RankingWeights::default(),
            max_candidates: 0,
        }
    }
}

impl AnalyserConfig {
    /// Reads a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let weights = &self.ranking;
        if !(weights.relationship.is_finite() && weights.attestation.is_finite()) {
            return Err(AnalysisError::Config("ranking weights must be finite".into()));
        }
        if weights.relationship < 0.0 || weights.attestation < 0.0 {
            return Err(AnalysisError::Config("ranking weights must be non-negative".into()));
        }
        Ok(())
    }

    pub fn closed_categories(&self) -> ClosedCategories {
        ClosedCategories::new(self.closed_category_tags.iter().map(String::as_str))
    }

    pub fn wildcards(&self) -> HashSet<String> {
        self.wildcard_tags.iter().cloned().collect()
    }
}

/// Classifies tags, sides and paradigms as closed-category.
#[derive(Debug, Clone, Default)]
pub struct ClosedCategories {
    tags: HashSet<String>,
}

impl ClosedCategories {
    pub fn new<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        Self { tags: tags.into_iter().map(str::to_string).collect() }
    }

    pub fn is_closed_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// True when any tag on the side is closed-category.
    pub fn is_closed_side(&self, side: &Side) -> bool {
        side.tags.iter().any(|tag| self.is_closed_tag(tag))
    }

    /// A paradigm is closed-category when the generation side of its first
    /// pair rule starts with a closed tag.
    pub fn is_closed_paradigm(&self, paradigm: &Paradigm) -> bool {
        paradigm
            .rules
            .iter()
            .flat_map(|rule| rule.children.iter())
            .find_map(|node| match node {
                Node::Pair { right, .. } => Some(right),
                _ => None,
            })
            .and_then(Side::first_tag)
            .is_some_and(|tag| self.is_closed_tag(tag))
    }
}
