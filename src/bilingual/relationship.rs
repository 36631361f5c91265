// File: src/bilingual/relationship.rs
//! Paradigm and lexical-category associations inferred from a bilingual
//! dictionary.

use crate::bilingual::lexical_forms::LexicalIndex;
use crate::config::{AnalyserConfig, ClosedCategories};
use crate::core::cooccurrence::CoOccurrenceTable;
use crate::core::types::{Dictionary, Node, Side};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Switches shared by both relationship builders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationshipOptions {
    /// Key the table by the right side of each link instead of the left.
    pub reverse: bool,
    /// Drop single observations before normalising.
    pub remove_singletons: bool,
    /// Skip links where either side is a closed category.
    pub remove_closed_categories: bool,
}

/// Normalised association scores: source key -> target key -> score in [0, 1].
/// Each row sums to 1 over the targets actually observed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    scores: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Paradigm of the left dictionary -> paradigm of the right dictionary.
pub type ParadigmRelationship = Relationship;

/// First tag of the left side -> first tag of the right side.
pub type CategoryRelationship = Relationship;

impl Relationship {
    pub fn from_table(table: &CoOccurrenceTable<String>) -> Self {
        let scores = table
            .normalise()
            .into_iter()
            .map(|(key, row)| (key, row.into_iter().collect()))
            .collect();
        Self { scores }
    }

    pub fn get(&self, source: &str) -> Option<&BTreeMap<String, f64>> {
        self.scores.get(source)
    }

    /// Zero when either key is unknown.
    pub fn score(&self, source: &str, target: &str) -> f64 {
        self.scores
            .get(source)
            .and_then(|row| row.get(target))
            .copied()
            .unwrap_or(0.0)
    }

    /// The highest-scoring target for `source`; ties go to the smaller key.
    pub fn best_match(&self, source: &str) -> Option<(&str, f64)> {
        self.scores.get(source)?.iter().fold(None, |best, (target, &score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((target.as_str(), score)),
        })
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.scores.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// One bilingual link: a `<p>` pairs two sides, an `<i>` links a side to itself.
#[derive(Debug, Clone, Copy)]
struct Link<'a> {
    left: &'a Side,
    right: &'a Side,
}

fn links(bilingual: &Dictionary) -> Vec<Link<'_>> {
    bilingual
        .entries()
        .filter(|entry| !entry.multiword)
        .flat_map(|entry| entry.children.iter())
        .filter_map(|node| match node {
            Node::Identity(side) => Some(Link { left: side, right: side }),
            Node::Pair { left, right } => Some(Link { left, right }),
            _ => None,
        })
        .collect()
}

/// Counts, per bilingual link, every (left paradigm, right paradigm) pair
/// the link resolves to. Links are counted in parallel into per-worker
/// tables merged at the end.
pub fn count_paradigm_links(
    bilingual: &Dictionary,
    left: &LexicalIndex,
    right: &LexicalIndex,
    options: RelationshipOptions,
    closed: &ClosedCategories,
) -> CoOccurrenceTable<String> {
    let links = links(bilingual);
    tracing::debug!(links = links.len(), "counting paradigm co-occurrences");

    links
        .par_iter()
        .fold(CoOccurrenceTable::new, |mut table, link| {
            record_paradigm_link(&mut table, link, left, right, options, closed);
            table
        })
        .reduce(CoOccurrenceTable::new, |mut acc, table| {
            acc.merge(table);
            acc
        })
}

fn record_paradigm_link(
    table: &mut CoOccurrenceTable<String>,
    link: &Link<'_>,
    left: &LexicalIndex,
    right: &LexicalIndex,
    options: RelationshipOptions,
    closed: &ClosedCategories,
) {
    if options.remove_closed_categories
        && (closed.is_closed_side(link.left) || closed.is_closed_side(link.right))
    {
        return;
    }
    let left_paradigms = left.paradigms_for(&link.left.text, &link.left.tags);
    if left_paradigms.is_empty() {
        return;
    }
    let right_paradigms = right.paradigms_for(&link.right.text, &link.right.tags);
    for l in &left_paradigms {
        for r in &right_paradigms {
            if options.reverse {
                table.add(r.clone(), l.clone());
            } else {
                table.add(l.clone(), r.clone());
            }
        }
    }
}

/// Builds the paradigm relationship between two monolingual dictionaries
/// linked by `bilingual`.
pub fn build_paradigm_relationship(
    bilingual: &Dictionary,
    left: &Dictionary,
    right: &Dictionary,
    options: RelationshipOptions,
    config: &AnalyserConfig,
) -> ParadigmRelationship {
    let left_index = LexicalIndex::build(left, config.wildcards());
    let right_index = LexicalIndex::build(right, config.wildcards());
    let closed = config.closed_categories();

    let mut table = count_paradigm_links(bilingual, &left_index, &right_index, options, &closed);
    let counted = table.cell_count();
    if options.remove_singletons {
        table.prune_singletons();
    }
    let relationship = Relationship::from_table(&table);
    tracing::info!(
        cells = counted,
        kept = table.cell_count(),
        paradigms = relationship.len(),
        reverse = options.reverse,
        "paradigm relationship built"
    );
    relationship
}

/// Counts (first left tag, first right tag) per bilingual link.
pub fn count_category_links(
    bilingual: &Dictionary,
    options: RelationshipOptions,
    closed: &ClosedCategories,
) -> CoOccurrenceTable<String> {
    let mut table = CoOccurrenceTable::new();
    for link in links(bilingual) {
        let (Some(l), Some(r)) = (link.left.first_tag(), link.right.first_tag()) else {
            continue;
        };
        if options.remove_closed_categories && (closed.is_closed_tag(l) || closed.is_closed_tag(r)) {
            continue;
        }
        if options.reverse {
            table.add(r.to_string(), l.to_string());
        } else {
            table.add(l.to_string(), r.to_string());
        }
    }
    table
}

/// Builds the lexical-category relationship of a bilingual dictionary.
pub fn build_category_relationship(
    bilingual: &Dictionary,
    options: RelationshipOptions,
    config: &AnalyserConfig,
) -> CategoryRelationship {
    let mut table = count_category_links(bilingual, options, &config.closed_categories());
    if options.remove_singletons {
        table.prune_singletons();
    }
    let relationship = Relationship::from_table(&table);
    tracing::info!(categories = relationship.len(), "category relationship built");
    relationship
}
