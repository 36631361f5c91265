// File: src/core/expansion.rs
//! Recursive expansion of entries through their paradigm chains.
//!
//! Both modes walk a node sequence with a running prefix state and descend
//! into every alternative rule of each referenced paradigm. Cyclic paradigm
//! graphs do not terminate here; see [`Dictionary::check_acyclic`].

use crate::core::candidate::Candidate;
use crate::core::types::{Dictionary, Entry, Node};
use std::collections::{BTreeSet, HashSet};

/// An (analysis, generation) pair produced by [`expand_to_pairs`].
pub type AnalysisPair = (String, String);

/// Expands an entry into the set of surface forms it produces.
///
/// Without lexical info every pair rule contributes its analysis text. With
/// lexical info it contributes the generation text followed by `<tag>`
/// markers, and a `+` marks a paradigm referenced from inside a paradigm
/// rule that already produced text (a joined lexical unit).
pub fn expand_to_forms(entry: &Entry, include_lexical_info: bool, dic: &Dictionary) -> BTreeSet<String> {
    let seed = BTreeSet::from([String::new()]);
    expand_forms(&entry.children, seed, include_lexical_info, dic, false)
}

/// Expands `stem` through the paradigm `name`. `None` if the paradigm is unknown.
pub fn expand_paradigm(
    name: &str,
    stem: &str,
    include_lexical_info: bool,
    dic: &Dictionary,
) -> Option<BTreeSet<String>> {
    dic.paradigm(name)?;
    Some(expand_paradigm_forms(name, stem.to_string(), include_lexical_info, dic))
}

fn expand_forms(
    children: &[Node],
    mut forms: BTreeSet<String>,
    lexical: bool,
    dic: &Dictionary,
    nested: bool,
) -> BTreeSet<String> {
    let mut produced = false;
    for node in children {
        match node {
            Node::Identity(side) => {
                forms = append_all(forms, &side.text);
                produced |= !side.text.is_empty();
            }
            Node::Text(text) => {
                forms = append_all(forms, text);
                produced |= !text.is_empty();
            }
            Node::Pair { left, right } => {
                let suffix = if lexical {
                    format!("{}{}", right.text, right.tag_markers())
                } else {
                    left.text.clone()
                };
                produced |= !suffix.is_empty();
                forms = append_all(forms, &suffix);
            }
            Node::ParadigmRef(name) => {
                let boundary = lexical && nested && produced;
                let mut expanded = BTreeSet::new();
                for mut prefix in forms {
                    if boundary {
                        prefix.push('+');
                    }
                    expanded.extend(expand_paradigm_forms(name, prefix, lexical, dic));
                }
                forms = expanded;
                produced = true;
            }
        }
    }
    forms
}

fn expand_paradigm_forms(name: &str, prefix: String, lexical: bool, dic: &Dictionary) -> BTreeSet<String> {
    let Some(paradigm) = dic.paradigm(name) else {
        tracing::debug!(paradigm = name, "reference to unknown paradigm");
        return BTreeSet::new();
    };
    let mut out = BTreeSet::new();
    for rule in &paradigm.rules {
        let seed = BTreeSet::from([prefix.clone()]);
        out.extend(expand_forms(&rule.children, seed, lexical, dic, true));
    }
    out
}

fn append_all(forms: BTreeSet<String>, suffix: &str) -> BTreeSet<String> {
    if suffix.is_empty() {
        return forms;
    }
    forms.into_iter().map(|form| form + suffix).collect()
}

/// Expands an entry into (analysis, generation) pairs.
///
/// The analysis side collects left texts; the generation side collects only
/// the `<tag>` markers of right sides, never their text. Paradigm
/// alternatives that are multiword, or whose direction label is contained in
/// `restriction`, are dropped together with everything below them.
pub fn expand_to_pairs(
    entry: &Entry,
    dic: &Dictionary,
    restriction: Option<&HashSet<String>>,
) -> Vec<AnalysisPair> {
    expand_pairs(&entry.children, vec![(String::new(), String::new())], dic, restriction)
}

fn expand_pairs(
    children: &[Node],
    mut pairs: Vec<AnalysisPair>,
    dic: &Dictionary,
    restriction: Option<&HashSet<String>>,
) -> Vec<AnalysisPair> {
    for node in children {
        match node {
            Node::Identity(side) => {
                for (analysis, _) in pairs.iter_mut() {
                    analysis.push_str(&side.text);
                }
            }
            Node::Text(text) => {
                for (analysis, _) in pairs.iter_mut() {
                    analysis.push_str(text);
                }
            }
            Node::Pair { left, right } => {
                let markers = right.tag_markers();
                for (analysis, generation) in pairs.iter_mut() {
                    analysis.push_str(&left.text);
                    generation.push_str(&markers);
                }
            }
            Node::ParadigmRef(name) => {
                pairs = pairs
                    .iter()
                    .flat_map(|(analysis, generation)| {
                        expand_paradigm_pairs(name, analysis, generation, dic, restriction)
                    })
                    .collect();
            }
        }
    }
    pairs
}

fn expand_paradigm_pairs(
    name: &str,
    analysis: &str,
    generation: &str,
    dic: &Dictionary,
    restriction: Option<&HashSet<String>>,
) -> Vec<AnalysisPair> {
    let Some(paradigm) = dic.paradigm(name) else {
        tracing::debug!(paradigm = name, "reference to unknown paradigm");
        return Vec::new();
    };
    paradigm
        .rules
        .iter()
        .filter(|rule| admits(rule, restriction))
        .flat_map(|rule| {
            let seed = vec![(analysis.to_string(), generation.to_string())];
            expand_pairs(&rule.children, seed, dic, restriction)
        })
        .collect()
}

fn admits(rule: &Entry, restriction: Option<&HashSet<String>>) -> bool {
    if rule.multiword {
        return false;
    }
    match (restriction, rule.restriction.as_deref()) {
        (Some(excluded), Some(label)) => !excluded.contains(label),
        _ => true,
    }
}

/// Pulls the (stem, paradigm) pair out of a single entry without recursion.
///
/// The stem comes from the `<i>` node, or from the left side of the pair rule
/// when there is none. Returns `None` unless the entry has exactly one
/// stem-bearing node with non-empty text and exactly one paradigm reference.
pub fn extract_stem_paradigm(entry: &Entry) -> Option<Candidate> {
    let mut stem: Option<&str> = None;
    let mut stems = 0;
    let mut paradigm: Option<&str> = None;
    let mut paradigms = 0;

    for node in &entry.children {
        match node {
            Node::Identity(side) => {
                stems += 1;
                stem.get_or_insert(side.text.as_str());
            }
            Node::Pair { left, .. } => {
                stems += 1;
                stem.get_or_insert(left.text.as_str());
            }
            Node::ParadigmRef(name) => {
                paradigms += 1;
                paradigm.get_or_insert(name.as_str());
            }
            Node::Text(_) => {}
        }
    }

    match (stem, paradigm) {
        (Some(stem), Some(paradigm)) if stems == 1 && paradigms == 1 && !stem.is_empty() => {
            Some(Candidate::new(stem, paradigm))
        }
        _ => None,
    }
}
